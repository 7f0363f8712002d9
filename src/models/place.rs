use serde::{Deserialize, Serialize};

/// WGS84 coordinate pair, in the places provider's field names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// A point of interest from the places provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

impl Place {
    pub fn location(&self) -> LatLng {
        self.geometry.location
    }

    /// Short address for the marker callout. Nearby search fills
    /// `vicinity`, text search fills `formatted_address`.
    pub fn address(&self) -> Option<&str> {
        self.vicinity
            .as_deref()
            .or(self.formatted_address.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_place_json() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "place_id": "ChIJx1",
            "name": "강남온누리약국",
            "vicinity": "서울 강남구 테헤란로 1",
            "geometry": {"location": {"lat": 37.4979, "lng": 127.0276}}
        }))
        .unwrap();
        assert_eq!(place.address(), Some("서울 강남구 테헤란로 1"));
        assert!((place.location().lat - 37.4979).abs() < f64::EPSILON);
    }

    #[test]
    fn address_falls_back_to_formatted_address() {
        let place: Place = serde_json::from_value(serde_json::json!({
            "place_id": "ChIJx2",
            "name": "약국",
            "formatted_address": "서울특별시 강남구",
            "geometry": {"location": {"lat": 37.0, "lng": 127.0}}
        }))
        .unwrap();
        assert_eq!(place.address(), Some("서울특별시 강남구"));
    }
}
