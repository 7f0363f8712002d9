//! Pharmacy map screen commands.

use crate::core_state::CoreState;
use crate::models::{LatLng, Place};
use crate::pharmacy::KeywordSearchOutcome;

/// Pharmacies around the user's current position.
pub async fn search_nearby_pharmacies(
    state: &CoreState,
    lat: f64,
    lng: f64,
) -> Result<Vec<Place>, String> {
    state
        .locator()
        .search_nearby(LatLng { lat, lng })
        .await
        .map_err(|e| e.user_message())
}

/// Keyword search, biased toward the map's current position when known.
pub async fn search_pharmacies_by_keyword(
    state: &CoreState,
    keyword: String,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<KeywordSearchOutcome, String> {
    let bias = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(LatLng { lat, lng }),
        _ => None,
    };
    state
        .locator()
        .search_by_keyword(&keyword, bias)
        .await
        .map_err(|e| e.user_message())
}
