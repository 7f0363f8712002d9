//! Daily dose reminder presets.
//!
//! Ten fixed slots (`p1`..`p10`) that live for the app's lifetime and
//! are only ever reconfigured. A slot is enabled exactly when it holds a
//! scheduled-notification handle, and it never holds more than one:
//! `save` cancels the previous handle before scheduling the replacement.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::notify::{NotificationId, NotificationScheduler, NotifyError};
use crate::registry::PillRegistry;

/// Number of preset slots. Fixed for the app's lifetime.
pub const PRESET_COUNT: usize = 10;

/// Default draft time for a never-configured slot.
pub const DEFAULT_TIME: &str = "09:00";

const NOTIFICATION_TITLE: &str = "복약 알림";

/// How many pill names the notification body lists before truncating to
/// an "외 N개" suffix.
const MAX_NAMES_IN_BODY: usize = 3;

/// 24-hour `HH:MM`, both fields zero-padded.
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("static time pattern"));

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

/// Errors from preset operations. The first three are user-correctable
/// and surfaced verbatim as guidance.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("알람 시간은 HH:MM(24시간) 형식이어야 해요: {0}")]
    InvalidTime(String),
    #[error("등록된 약이 없어요. 먼저 채팅에서 약을 추가해주세요.")]
    NoPillsRegistered,
    #[error("알림을 받을 약을 하나 이상 선택해주세요.")]
    EmptySelection,
    #[error("Unknown preset slot: {0}")]
    UnknownSlot(String),
    #[error(transparent)]
    Scheduler(#[from] NotifyError),
}

/// Outcome of a cancel request. "Nothing to cancel" is information, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled,
    NothingScheduled,
}

/// One preset slot's stored configuration.
#[derive(Debug, Clone)]
struct PresetSlot {
    key: String,
    time: Option<String>,
    selected_pill_ids: BTreeSet<String>,
    notification_id: Option<NotificationId>,
}

/// Slot summary for the preset bar.
#[derive(Debug, Clone, Serialize)]
pub struct PresetView {
    pub key: String,
    pub enabled: bool,
    pub time_text: Option<String>,
}

/// Editable copy of a slot's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetDraft {
    pub key: String,
    pub time: String,
    pub selected_pill_ids: BTreeSet<String>,
}

impl PresetDraft {
    /// Set-membership flip.
    pub fn toggle(&mut self, pill_id: &str) {
        if !self.selected_pill_ids.remove(pill_id) {
            self.selected_pill_ids.insert(pill_id.to_string());
        }
    }
}

// ═══════════════════════════════════════════
// Store
// ═══════════════════════════════════════════

pub struct ReminderPresets {
    slots: Vec<PresetSlot>,
}

impl ReminderPresets {
    pub fn new() -> Self {
        let slots = (1..=PRESET_COUNT)
            .map(|n| PresetSlot {
                key: format!("p{n}"),
                time: None,
                selected_pill_ids: BTreeSet::new(),
                notification_id: None,
            })
            .collect();
        Self { slots }
    }

    fn index(&self, key: &str) -> Result<usize, ReminderError> {
        self.slots
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| ReminderError::UnknownSlot(key.to_string()))
    }

    /// Slot summaries in `p1`..`p10` order.
    pub fn presets(&self) -> Vec<PresetView> {
        self.slots
            .iter()
            .map(|s| PresetView {
                key: s.key.clone(),
                enabled: s.notification_id.is_some(),
                time_text: s.time.clone(),
            })
            .collect()
    }

    /// Copy a slot's configuration into an editable draft. Pure state
    /// copy; never-configured slots get the defaults.
    pub fn open(&self, key: &str) -> Result<PresetDraft, ReminderError> {
        let slot = &self.slots[self.index(key)?];
        Ok(PresetDraft {
            key: slot.key.clone(),
            time: slot.time.clone().unwrap_or_else(|| DEFAULT_TIME.to_string()),
            selected_pill_ids: slot.selected_pill_ids.clone(),
        })
    }

    /// Validate and persist a draft: cancel the slot's previous
    /// notification, schedule the new daily one, store the handle plus
    /// the draft's time/selection.
    pub async fn save(
        &mut self,
        draft: &PresetDraft,
        registry: &PillRegistry,
        scheduler: &dyn NotificationScheduler,
    ) -> Result<NotificationId, ReminderError> {
        let idx = self.index(&draft.key)?;

        let (hour, minute) = parse_time(&draft.time)?;
        if registry.is_empty() {
            return Err(ReminderError::NoPillsRegistered);
        }
        if draft.selected_pill_ids.is_empty() {
            return Err(ReminderError::EmptySelection);
        }
        // Resolve names in registry order; ids of since-removed pills
        // drop out of the selection here.
        let names: Vec<&str> = registry
            .pills()
            .iter()
            .filter(|p| draft.selected_pill_ids.contains(&p.id))
            .map(|p| p.name.as_str())
            .collect();
        if names.is_empty() {
            return Err(ReminderError::EmptySelection);
        }

        // At most one live notification per slot: the old handle is
        // cancelled before the replacement is scheduled.
        if let Some(old) = self.slots[idx].notification_id.take() {
            scheduler.cancel(old).await?;
        }

        let body = notification_body(&names);
        let id = scheduler
            .schedule_daily(hour, minute, NOTIFICATION_TITLE, &body)
            .await?;

        let slot = &mut self.slots[idx];
        slot.time = Some(draft.time.clone());
        slot.selected_pill_ids = retain_known_ids(&draft.selected_pill_ids, registry);
        slot.notification_id = Some(id);
        tracing::info!(slot = %slot.key, time = %draft.time, pills = names.len(), "Reminder saved");
        Ok(id)
    }

    /// Cancel a slot's notification, keeping its time/selection so
    /// re-opening the slot starts from the last configuration.
    pub async fn cancel(
        &mut self,
        key: &str,
        scheduler: &dyn NotificationScheduler,
    ) -> Result<CancelOutcome, ReminderError> {
        let idx = self.index(key)?;
        match self.slots[idx].notification_id {
            None => Ok(CancelOutcome::NothingScheduled),
            Some(id) => {
                scheduler.cancel(id).await?;
                self.slots[idx].notification_id = None;
                tracing::info!(slot = key, "Reminder cancelled");
                Ok(CancelOutcome::Cancelled)
            }
        }
    }
}

impl Default for ReminderPresets {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_time(time: &str) -> Result<(u32, u32), ReminderError> {
    let captures = TIME_PATTERN
        .captures(time)
        .ok_or_else(|| ReminderError::InvalidTime(time.to_string()))?;
    let hour = captures[1].parse().expect("matched two digits");
    let minute = captures[2].parse().expect("matched two digits");
    Ok((hour, minute))
}

fn notification_body(names: &[&str]) -> String {
    let shown = names[..names.len().min(MAX_NAMES_IN_BODY)].join(", ");
    if names.len() > MAX_NAMES_IN_BODY {
        format!("{shown} 외 {}개 복용 시간이에요", names.len() - MAX_NAMES_IN_BODY)
    } else {
        format!("{shown} 복용 시간이에요")
    }
}

/// Keep only selected ids that still resolve in the registry.
fn retain_known_ids(selected: &BTreeSet<String>, registry: &PillRegistry) -> BTreeSet<String> {
    selected
        .iter()
        .filter(|id| registry.get(id).is_some())
        .cloned()
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
