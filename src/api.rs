//! AI pharmacist backend client.
//!
//! Two endpoints are consumed, never implemented here:
//! - `POST /consult` — advice text for an identified pill + topic
//! - `POST /register-drug-image?mode=…` — multipart photo upload,
//!   returns the structured analysis in `detected_data`
//!
//! `PharmacistApi` is the seam the sessions talk to; `BackendClient` is
//! the reqwest implementation and `MockPharmacistApi` the configurable
//! test double.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::{AnalysisMode, Candidate, IdentifyResult, PrescriptionAnalysis};

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

/// Profile sent along with a consultation request so the advice can be
/// personalized.
// TODO: source this from user settings once the profile screen lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub symptom: String,
    pub age: u32,
    pub condition: String,
}

impl UserProfile {
    pub fn default_profile() -> Self {
        Self {
            symptom: "속이 쓰리고 소화가 잘 안 돼요".to_string(),
            age: 45,
            condition: "특이사항 없음".to_string(),
        }
    }
}

/// Errors from backend API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach the backend at {0}")]
    Connection(String),
    #[error("Backend returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("Candidate id is not a numeric class id: {0}")]
    InvalidClassId(String),
    #[error("Cannot read image {path}: {source}")]
    ImageRead {
        path: String,
        source: std::io::Error,
    },
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Backend seam used by the chat-style sessions.
#[async_trait]
pub trait PharmacistApi: Send + Sync {
    /// Identify the pill in a photo as ranked name candidates.
    async fn identify(&self, image_uri: &str) -> Result<IdentifyResult, ApiError>;

    /// Fetch advice text for an identified pill and the chosen topics.
    async fn consult(
        &self,
        class_id: i64,
        profile: &UserProfile,
        options: &[String],
    ) -> Result<String, ApiError>;

    /// Upload a prescription/pill-bag/food photo for structured analysis.
    async fn analyze_prescription(
        &self,
        image_uri: &str,
        mode: AnalysisMode,
    ) -> Result<PrescriptionAnalysis, ApiError>;
}

// ═══════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════

#[derive(Serialize)]
struct ConsultRequest<'a> {
    class_id: i64,
    user_profile: &'a UserProfile,
    options: &'a [String],
}

#[derive(Deserialize)]
struct ConsultResponse {
    advice: Option<String>,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    #[allow(dead_code)]
    status: Option<String>,
    #[allow(dead_code)]
    message: Option<String>,
    detected_data: Option<PrescriptionAnalysis>,
}

// ═══════════════════════════════════════════
// BackendClient
// ═══════════════════════════════════════════

/// Default request timeout for backend calls, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed implementation of [`PharmacistApi`].
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client pointed at `PILLCHAT_BACKEND_URL` (default localhost:8000).
    pub fn from_env() -> Self {
        Self::new(&config::backend_url(), DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ApiError::Http("Request timed out".to_string())
        } else {
            ApiError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl PharmacistApi for BackendClient {
    async fn identify(&self, image_uri: &str) -> Result<IdentifyResult, ApiError> {
        // Stand-in detector result until the model server exposes an
        // image upload endpoint.
        // TODO: replace with a multipart upload once detector serving lands.
        tracing::debug!(uri = image_uri, "Identify requested (stand-in detector)");
        let candidates = vec![Candidate {
            id: "0".to_string(),
            name: "타치온정50밀리그램(글루타티온(환원형))".to_string(),
            score: 99.0,
        }];
        Ok(IdentifyResult {
            extracted_text: "TACHION".to_string(),
            best_match: candidates.first().cloned(),
            candidates,
        })
    }

    async fn consult(
        &self,
        class_id: i64,
        profile: &UserProfile,
        options: &[String],
    ) -> Result<String, ApiError> {
        let url = format!("{}/consult", self.base_url);
        let body = ConsultRequest {
            class_id,
            user_profile: profile,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ConsultResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        parsed
            .advice
            .ok_or_else(|| ApiError::MalformedResponse("missing advice field".to_string()))
    }

    async fn analyze_prescription(
        &self,
        image_uri: &str,
        mode: AnalysisMode,
    ) -> Result<PrescriptionAnalysis, ApiError> {
        let bytes = tokio::fs::read(image_uri)
            .await
            .map_err(|source| ApiError::ImageRead {
                path: image_uri.to_string(),
                source,
            })?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("prescription.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/register-drug-image", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("mode", mode.as_query_param())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        parsed
            .detected_data
            .ok_or_else(|| ApiError::MalformedResponse("missing detected_data field".to_string()))
    }
}

// ═══════════════════════════════════════════
// MockPharmacistApi
// ═══════════════════════════════════════════

/// Mock pharmacist backend for testing — configurable responses plus
/// call recording.
pub struct MockPharmacistApi {
    identify_response: Option<IdentifyResult>,
    advice_response: Option<String>,
    consult_malformed: bool,
    analysis_response: Option<PrescriptionAnalysis>,
    calls: Mutex<RecordedCalls>,
}

#[derive(Debug, Default, Clone)]
pub struct RecordedCalls {
    pub identify: Vec<String>,
    pub consult: Vec<(i64, Vec<String>)>,
    pub analyze: Vec<(String, AnalysisMode)>,
}

impl MockPharmacistApi {
    /// Mock with the stand-in detector result, a canned advice string,
    /// and a minimal recognized analysis payload.
    pub fn new() -> Self {
        let candidate = Candidate {
            id: "0".to_string(),
            name: "타치온정50밀리그램(글루타티온(환원형))".to_string(),
            score: 99.0,
        };
        Self {
            identify_response: Some(IdentifyResult {
                extracted_text: "TACHION".to_string(),
                best_match: Some(candidate.clone()),
                candidates: vec![candidate],
            }),
            advice_response: Some("식후 30분에 복용하세요.".to_string()),
            consult_malformed: false,
            analysis_response: Some(
                serde_json::from_value(serde_json::json!({
                    "medications": [{"name": "약A", "dose": "하루 2회"}]
                }))
                .expect("static analysis payload"),
            ),
            calls: Mutex::new(RecordedCalls::default()),
        }
    }

    pub fn with_identify(mut self, result: IdentifyResult) -> Self {
        self.identify_response = Some(result);
        self
    }

    pub fn failing_identify(mut self) -> Self {
        self.identify_response = None;
        self
    }

    pub fn with_advice(mut self, advice: &str) -> Self {
        self.advice_response = Some(advice.to_string());
        self
    }

    pub fn failing_consult(mut self) -> Self {
        self.advice_response = None;
        self
    }

    pub fn malformed_consult(mut self) -> Self {
        self.consult_malformed = true;
        self
    }

    pub fn with_analysis(mut self, analysis: PrescriptionAnalysis) -> Self {
        self.analysis_response = Some(analysis);
        self
    }

    pub fn failing_analysis(mut self) -> Self {
        self.analysis_response = None;
        self
    }

    pub fn recorded(&self) -> RecordedCalls {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockPharmacistApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PharmacistApi for MockPharmacistApi {
    async fn identify(&self, image_uri: &str) -> Result<IdentifyResult, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.identify.push(image_uri.to_string());
        }
        self.identify_response
            .clone()
            .ok_or_else(|| ApiError::Connection("mock".to_string()))
    }

    async fn consult(
        &self,
        class_id: i64,
        _profile: &UserProfile,
        options: &[String],
    ) -> Result<String, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.consult.push((class_id, options.to_vec()));
        }
        if self.consult_malformed {
            return Err(ApiError::MalformedResponse(
                "missing advice field".to_string(),
            ));
        }
        self.advice_response
            .clone()
            .ok_or_else(|| ApiError::Connection("mock".to_string()))
    }

    async fn analyze_prescription(
        &self,
        image_uri: &str,
        mode: AnalysisMode,
    ) -> Result<PrescriptionAnalysis, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.analyze.push((image_uri.to_string(), mode));
        }
        self.analysis_response
            .clone()
            .ok_or_else(|| ApiError::Connection("mock".to_string()))
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
