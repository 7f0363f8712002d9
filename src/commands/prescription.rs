//! Prescription chat screen commands.

use serde::Deserialize;

use crate::core_state::CoreState;
use crate::models::{AnalysisMode, Message};
use crate::session::SendError;

fn default_mode() -> AnalysisMode {
    AnalysisMode::PillBag
}

/// One send from the prescription input bar. The mode comes from which
/// chat room the user is in (pill bag, hospital prescription, food).
#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionInput {
    pub text: Option<String>,
    pub image_uri: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: AnalysisMode,
}

/// Submit the input bar's current content. Returns the updated log.
pub async fn send_prescription_message(
    state: &CoreState,
    input: PrescriptionInput,
) -> Result<Vec<Message>, String> {
    let mut session = state
        .prescription()
        .try_lock()
        .map_err(|_| SendError::Busy.to_string())?;

    if let Some(uri) = input.image_uri {
        session
            .submit_image(&uri, input.mode)
            .await
            .map_err(|e| e.to_string())?;
    } else if let Some(text) = input.text {
        session.send_text(&text).map_err(|e| e.to_string())?;
    }
    Ok(session.messages().to_vec())
}

/// Current message log for rendering.
pub async fn get_prescription_messages(state: &CoreState) -> Result<Vec<Message>, String> {
    Ok(state.prescription().lock().await.messages().to_vec())
}
