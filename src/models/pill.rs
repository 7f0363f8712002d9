use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered pill. Identity is the backend class id; `added_at` is the
/// moment the user accepted the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pill {
    pub id: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

impl Pill {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            added_at: Utc::now(),
        }
    }
}
