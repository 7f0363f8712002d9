//! Pharmacy locator.
//!
//! On-demand queries against the places provider, rendered as map
//! markers by the shell. Keyword searches are scoped to pharmacies by
//! appending "약국" to the query, and recenter the map on the first hit.

use std::sync::Arc;

use serde::Serialize;

use crate::config;
use crate::models::{LatLng, Place};
use crate::places::{LocationBias, PlacesApi, PlacesError};

/// Result of a keyword search: markers plus the recenter target (the
/// first result's location, when there is one).
#[derive(Debug, Clone, Serialize)]
pub struct KeywordSearchOutcome {
    pub places: Vec<Place>,
    pub recenter: Option<LatLng>,
}

pub struct PharmacyLocator {
    places: Arc<dyn PlacesApi>,
}

impl PharmacyLocator {
    pub fn new(places: Arc<dyn PlacesApi>) -> Self {
        Self { places }
    }

    /// Pharmacies within the fixed radius around a coordinate. An empty
    /// result set is a valid, non-error outcome.
    pub async fn search_nearby(&self, center: LatLng) -> Result<Vec<Place>, PlacesError> {
        let places = self
            .places
            .nearby_search(center, config::NEARBY_RADIUS_M, "pharmacy")
            .await?;
        tracing::debug!(count = places.len(), "Nearby pharmacy search completed");
        Ok(places)
    }

    /// Free-text pharmacy search, optionally biased toward a location.
    pub async fn search_by_keyword(
        &self,
        keyword: &str,
        bias_center: Option<LatLng>,
    ) -> Result<KeywordSearchOutcome, PlacesError> {
        let query = format!("{} 약국", keyword.trim());
        let bias = bias_center.map(|center| LocationBias {
            center,
            radius_m: config::KEYWORD_BIAS_RADIUS_M,
        });

        let places = self.places.text_search(&query, bias).await?;
        let recenter = places.first().map(|p| p.location());
        tracing::debug!(query, count = places.len(), "Keyword pharmacy search completed");
        Ok(KeywordSearchOutcome { places, recenter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::MockPlacesClient;

    fn place(id: &str, name: &str, lat: f64, lng: f64) -> Place {
        serde_json::from_value(serde_json::json!({
            "place_id": id,
            "name": name,
            "geometry": {"location": {"lat": lat, "lng": lng}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn zero_results_keyword_search_is_not_an_error() {
        let locator = PharmacyLocator::new(Arc::new(MockPlacesClient::new(Vec::new())));
        let outcome = locator.search_by_keyword("강남", None).await.unwrap();
        assert!(outcome.places.is_empty());
        assert!(outcome.recenter.is_none());
    }

    #[tokio::test]
    async fn keyword_search_scopes_query_to_pharmacies() {
        let mock = Arc::new(MockPlacesClient::new(Vec::new()));
        let locator = PharmacyLocator::new(mock.clone());
        locator
            .search_by_keyword("강남", Some(LatLng { lat: 37.5, lng: 127.0 }))
            .await
            .unwrap();

        assert_eq!(mock.text_queries(), vec!["강남 약국".to_string()]);
    }

    #[tokio::test]
    async fn keyword_search_recenters_on_first_result() {
        let results = vec![
            place("a", "강남온누리약국", 37.4979, 127.0276),
            place("b", "강남중앙약국", 37.4981, 127.0290),
        ];
        let locator = PharmacyLocator::new(Arc::new(MockPlacesClient::new(results)));
        let outcome = locator.search_by_keyword("강남", None).await.unwrap();

        assert_eq!(outcome.places.len(), 2);
        let recenter = outcome.recenter.unwrap();
        assert!((recenter.lat - 37.4979).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn provider_error_is_surfaced() {
        let locator = PharmacyLocator::new(Arc::new(MockPlacesClient::with_provider_error(
            "REQUEST_DENIED",
            Some("The provided API key is invalid."),
        )));
        let err = locator
            .search_nearby(LatLng { lat: 37.5, lng: 127.0 })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "The provided API key is invalid.");
    }

    #[tokio::test]
    async fn nearby_search_returns_markers() {
        let results = vec![place("a", "온누리약국", 37.5, 127.0)];
        let locator = PharmacyLocator::new(Arc::new(MockPlacesClient::new(results)));
        let places = locator
            .search_nearby(LatLng { lat: 37.5, lng: 127.0 })
            .await
            .unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "온누리약국");
    }
}
