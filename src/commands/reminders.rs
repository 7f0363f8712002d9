//! Reminder preset screen commands.

use crate::core_state::CoreState;
use crate::reminders::{CancelOutcome, PresetDraft, PresetView};

/// Slot summaries for the preset bar.
pub async fn list_reminder_presets(state: &CoreState) -> Result<Vec<PresetView>, String> {
    Ok(state.presets().lock().await.presets())
}

/// Load a slot's configuration into an editable draft.
pub async fn open_reminder_preset(state: &CoreState, key: String) -> Result<PresetDraft, String> {
    state
        .presets()
        .lock()
        .await
        .open(&key)
        .map_err(|e| e.to_string())
}

/// Validate and persist a draft; reschedules the slot's notification.
/// Returns the updated slot summaries.
pub async fn save_reminder_preset(
    state: &CoreState,
    draft: PresetDraft,
) -> Result<Vec<PresetView>, String> {
    let registry = state.pills_snapshot().map_err(|e| e.to_string())?;
    let mut presets = state.presets().lock().await;
    presets
        .save(&draft, &registry, state.scheduler())
        .await
        .map_err(|e| e.to_string())?;
    Ok(presets.presets())
}

/// Cancel a slot's notification. The returned text is shown as an
/// informational alert either way.
pub async fn cancel_reminder_preset(state: &CoreState, key: String) -> Result<String, String> {
    let outcome = state
        .presets()
        .lock()
        .await
        .cancel(&key, state.scheduler())
        .await
        .map_err(|e| e.to_string())?;

    Ok(match outcome {
        CancelOutcome::Cancelled => "알림이 해제되었어요.".to_string(),
        CancelOutcome::NothingScheduled => "해제할 알림이 없어요.".to_string(),
    })
}
