//! Places provider client (read-only).
//!
//! Two JSON endpoints: nearby search by coordinate + category, and free
//! text search with an optional location bias. `ZERO_RESULTS` is a valid
//! empty outcome, not an error; every other non-`OK` status is surfaced
//! with the provider's `error_message`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{LatLng, Place};

/// Errors from places provider operations.
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("Cannot reach the places provider")]
    Connection,
    #[error("Places error: {status}")]
    Provider {
        status: String,
        message: Option<String>,
    },
    #[error("Malformed places response: {0}")]
    MalformedResponse(String),
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl PlacesError {
    /// Alert text: the provider's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Location bias for text search.
#[derive(Debug, Clone, Copy)]
pub struct LocationBias {
    pub center: LatLng,
    pub radius_m: u32,
}

/// Places provider seam.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn nearby_search(
        &self,
        center: LatLng,
        radius_m: u32,
        category: &str,
    ) -> Result<Vec<Place>, PlacesError>;

    async fn text_search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<Place>, PlacesError>;
}

// ═══════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════

#[derive(Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<Place>,
}

impl PlacesResponse {
    fn into_results(self) -> Result<Vec<Place>, PlacesError> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(self.results),
            _ => Err(PlacesError::Provider {
                status: self.status,
                message: self.error_message,
            }),
        }
    }
}

// ═══════════════════════════════════════════
// GooglePlacesClient
// ═══════════════════════════════════════════

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// reqwest-backed implementation of [`PlacesApi`].
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    /// Client keyed by `GOOGLE_PLACES_API_KEY`.
    pub fn from_env() -> Self {
        let key = crate::config::places_api_key();
        if key.is_empty() {
            tracing::warn!("GOOGLE_PLACES_API_KEY is not set; pharmacy search will be denied");
        }
        Self::new(DEFAULT_BASE_URL, &key)
    }

    fn classify(e: reqwest::Error) -> PlacesError {
        if e.is_connect() || e.is_timeout() {
            PlacesError::Connection
        } else {
            PlacesError::Http(e.to_string())
        }
    }

    async fn fetch(&self, url: String, params: Vec<(String, String)>) -> Result<Vec<Place>, PlacesError> {
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(Self::classify)?;

        let parsed: PlacesResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::MalformedResponse(e.to_string()))?;

        parsed.into_results()
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn nearby_search(
        &self,
        center: LatLng,
        radius_m: u32,
        category: &str,
    ) -> Result<Vec<Place>, PlacesError> {
        let url = format!("{}/nearbysearch/json", self.base_url);
        let params = vec![
            ("location".to_string(), format!("{},{}", center.lat, center.lng)),
            ("radius".to_string(), radius_m.to_string()),
            ("type".to_string(), category.to_string()),
            ("key".to_string(), self.api_key.clone()),
        ];
        self.fetch(url, params).await
    }

    async fn text_search(
        &self,
        query: &str,
        bias: Option<LocationBias>,
    ) -> Result<Vec<Place>, PlacesError> {
        let url = format!("{}/textsearch/json", self.base_url);
        let mut params = vec![("query".to_string(), query.to_string())];
        if let Some(bias) = bias {
            params.push((
                "location".to_string(),
                format!("{},{}", bias.center.lat, bias.center.lng),
            ));
            params.push(("radius".to_string(), bias.radius_m.to_string()));
        }
        params.push(("key".to_string(), self.api_key.clone()));
        self.fetch(url, params).await
    }
}

// ═══════════════════════════════════════════
// MockPlacesClient
// ═══════════════════════════════════════════

/// Mock places provider for testing — fixed result set or a provider
/// error, plus recorded text queries.
pub struct MockPlacesClient {
    results: Vec<Place>,
    provider_error: Option<(String, Option<String>)>,
    text_queries: Mutex<Vec<String>>,
}

impl MockPlacesClient {
    pub fn new(results: Vec<Place>) -> Self {
        Self {
            results,
            provider_error: None,
            text_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_provider_error(status: &str, message: Option<&str>) -> Self {
        Self {
            results: Vec::new(),
            provider_error: Some((status.to_string(), message.map(str::to_string))),
            text_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn text_queries(&self) -> Vec<String> {
        self.text_queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn respond(&self) -> Result<Vec<Place>, PlacesError> {
        match &self.provider_error {
            Some((status, message)) => Err(PlacesError::Provider {
                status: status.clone(),
                message: message.clone(),
            }),
            None => Ok(self.results.clone()),
        }
    }
}

#[async_trait]
impl PlacesApi for MockPlacesClient {
    async fn nearby_search(
        &self,
        _center: LatLng,
        _radius_m: u32,
        _category: &str,
    ) -> Result<Vec<Place>, PlacesError> {
        self.respond()
    }

    async fn text_search(
        &self,
        query: &str,
        _bias: Option<LocationBias>,
    ) -> Result<Vec<Place>, PlacesError> {
        if let Ok(mut queries) = self.text_queries.lock() {
            queries.push(query.to_string());
        }
        self.respond()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
