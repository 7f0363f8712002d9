//! In-memory pill registry.
//!
//! The process-wide list of pills the user has registered from the chat
//! and prescription flows. Nothing here is persisted; the list lives for
//! the lifetime of the app.

use crate::models::Pill;

/// Registered pills, most recently added first.
#[derive(Debug, Clone, Default)]
pub struct PillRegistry {
    pills: Vec<Pill>,
}

impl PillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Front-insert a pill. Adding an id that is already registered is an
    /// idempotent no-op that keeps the original entry (and its
    /// `added_at`). Returns whether an entry was inserted.
    pub fn add(&mut self, id: impl Into<String>, name: impl Into<String>) -> bool {
        let id = id.into();
        if self.pills.iter().any(|p| p.id == id) {
            return false;
        }
        self.pills.insert(0, Pill::new(id, name));
        true
    }

    /// Remove by id; no-op when absent. Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.pills.len();
        self.pills.retain(|p| p.id != id);
        self.pills.len() != before
    }

    pub fn clear(&mut self) {
        self.pills.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Pill> {
        self.pills.iter().find(|p| p.id == id)
    }

    pub fn pills(&self) -> &[Pill] {
        &self.pills
    }

    pub fn len(&self) -> usize {
        self.pills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pills.is_empty()
    }
}
