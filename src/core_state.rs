//! Transport-agnostic application state.
//!
//! `CoreState` is the single shared context handed to every screen:
//! the pill registry, both chat sessions, the reminder presets, and the
//! external-service handles. Created once at app start, lives for the
//! process. Sessions sit behind `tokio::sync::Mutex` because their
//! operations hold `&mut` across network awaits; the registry only sees
//! synchronous access and uses `RwLock`.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{BackendClient, PharmacistApi};
use crate::chat::ChatSession;
use crate::notify::{InProcessScheduler, NotificationScheduler};
use crate::pharmacy::PharmacyLocator;
use crate::places::{GooglePlacesClient, PlacesApi};
use crate::prescription::PrescriptionSession;
use crate::registry::PillRegistry;
use crate::reminders::ReminderPresets;

/// Errors from CoreState lock handling.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

pub struct CoreState {
    pills: RwLock<PillRegistry>,
    presets: tokio::sync::Mutex<ReminderPresets>,
    chat: tokio::sync::Mutex<ChatSession>,
    prescription: tokio::sync::Mutex<PrescriptionSession>,
    pharmacist: Arc<dyn PharmacistApi>,
    scheduler: Arc<dyn NotificationScheduler>,
    locator: PharmacyLocator,
}

impl CoreState {
    /// State wired to the real backend, places provider, and the
    /// in-process scheduler (the device shell swaps in its own).
    pub fn new() -> Self {
        Self::with_services(
            Arc::new(BackendClient::from_env()),
            Arc::new(GooglePlacesClient::from_env()),
            Arc::new(InProcessScheduler::new()),
        )
    }

    /// State with injected services. Tests use this with the mocks.
    pub fn with_services(
        pharmacist: Arc<dyn PharmacistApi>,
        places: Arc<dyn PlacesApi>,
        scheduler: Arc<dyn NotificationScheduler>,
    ) -> Self {
        Self {
            pills: RwLock::new(PillRegistry::new()),
            presets: tokio::sync::Mutex::new(ReminderPresets::new()),
            chat: tokio::sync::Mutex::new(ChatSession::new(pharmacist.clone())),
            prescription: tokio::sync::Mutex::new(PrescriptionSession::new(pharmacist.clone())),
            pharmacist,
            scheduler,
            locator: PharmacyLocator::new(places),
        }
    }

    // ── Pill registry ───────────────────────────────────────

    pub fn read_pills(&self) -> Result<RwLockReadGuard<'_, PillRegistry>, CoreError> {
        self.pills.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_pills(&self) -> Result<RwLockWriteGuard<'_, PillRegistry>, CoreError> {
        self.pills.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Owned registry snapshot for operations that hold it across an
    /// await (the std guard must not cross one).
    pub fn pills_snapshot(&self) -> Result<PillRegistry, CoreError> {
        Ok(self.read_pills()?.clone())
    }

    // ── Sessions and services ───────────────────────────────

    pub fn chat(&self) -> &tokio::sync::Mutex<ChatSession> {
        &self.chat
    }

    pub fn prescription(&self) -> &tokio::sync::Mutex<PrescriptionSession> {
        &self.prescription
    }

    pub fn presets(&self) -> &tokio::sync::Mutex<ReminderPresets> {
        &self.presets
    }

    pub fn pharmacist(&self) -> &Arc<dyn PharmacistApi> {
        &self.pharmacist
    }

    pub fn scheduler(&self) -> &dyn NotificationScheduler {
        self.scheduler.as_ref()
    }

    pub fn locator(&self) -> &PharmacyLocator {
        &self.locator
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPharmacistApi;
    use crate::places::MockPlacesClient;

    fn test_state() -> CoreState {
        CoreState::with_services(
            Arc::new(MockPharmacistApi::new()),
            Arc::new(MockPlacesClient::new(Vec::new())),
            Arc::new(InProcessScheduler::new()),
        )
    }

    #[test]
    fn fresh_state_has_empty_registry_and_ten_presets() {
        let state = test_state();
        assert!(state.read_pills().unwrap().is_empty());
        assert_eq!(
            state.presets().try_lock().unwrap().presets().len(),
            crate::reminders::PRESET_COUNT
        );
    }

    #[test]
    fn pills_snapshot_is_detached_from_the_registry() {
        let state = test_state();
        state.write_pills().unwrap().add("0", "타치온정");

        let snapshot = state.pills_snapshot().unwrap();
        state.write_pills().unwrap().clear();

        assert_eq!(snapshot.len(), 1);
        assert!(state.read_pills().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_are_seeded_and_idle() {
        let state = test_state();
        assert_eq!(state.chat().lock().await.messages().len(), 1);
        assert_eq!(state.prescription().lock().await.messages().len(), 1);
        assert!(!state.chat().lock().await.is_loading());
    }
}
