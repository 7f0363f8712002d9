use serde::{Deserialize, Serialize};

/// A ranked pill-name candidate from the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub score: f32,
}

/// Result of one image identification: the text read off the pill plus
/// ranked candidates. `best_match` is the top candidate when the detector
/// is confident enough to pick one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResult {
    pub extracted_text: String,
    pub best_match: Option<Candidate>,
    pub candidates: Vec<Candidate>,
}

impl IdentifyResult {
    pub fn has_match(&self) -> bool {
        self.best_match.is_some()
    }
}
