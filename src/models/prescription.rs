//! Prescription analysis payloads.
//!
//! The backend's vision model returns loosely-structured JSON whose fields
//! depend on the analysis mode. Nothing here enforces a schema: every
//! field is optional and unknown fields are retained, so rendering can
//! degrade gracefully when the model omits or invents keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of document the submitted photo is.
///
/// The wire value is the `mode` query parameter of the analysis endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Pharmacy pill bag ("약봉투").
    #[serde(rename = "prescription")]
    PillBag,
    /// Hospital-issued prescription form.
    HospitalPrescription,
    /// Food photo, checked for drug interactions.
    Food,
}

impl AnalysisMode {
    pub fn as_query_param(&self) -> &'static str {
        match self {
            Self::PillBag => "prescription",
            Self::HospitalPrescription => "hospital_prescription",
            Self::Food => "food",
        }
    }

    /// Caption attached to the user's image bubble.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::PillBag => "약봉투(약국) 사진을 보냈어요.",
            Self::HospitalPrescription => "처방전(병원) 사진을 보냈어요.",
            Self::Food => "음식 사진을 보냈어요.",
        }
    }
}

/// Structured analysis extracted from a prescription/pill-bag/food photo.
///
/// Pharmacy-bag mode fills `medications`/`schedule`/`precautions`,
/// hospital mode fills `prescribed_drugs`/`institution`/`patient`/
/// `diagnosis_codes`, food mode fills `detected_items`/
/// `main_ingredients`/`warning_message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescribed_drugs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precautions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_ingredients: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PrescriptionAnalysis {
    /// Whether the payload carries any recognizable medication list.
    /// Anything else renders as an "unclear result" message.
    pub fn has_recognized_medications(&self) -> bool {
        self.medications.is_some()
            || self.prescribed_drugs.is_some()
            || self.detected_items.is_some()
    }
}
