//! Pill chat screen commands.

use serde::Deserialize;

use crate::core_state::CoreState;
use crate::models::{Candidate, Message};
use crate::session::SendError;

/// One send from the input bar. A pending photo wins over typed text,
/// mirroring the input bar's preview slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatInput {
    pub text: Option<String>,
    pub image_uri: Option<String>,
}

/// Submit the input bar's current content. Returns the updated log.
pub async fn send_chat_message(
    state: &CoreState,
    input: ChatInput,
) -> Result<Vec<Message>, String> {
    let mut session = state
        .chat()
        .try_lock()
        .map_err(|_| SendError::Busy.to_string())?;

    if let Some(uri) = input.image_uri {
        session.send_image(&uri).await.map_err(|e| e.to_string())?;
    } else if let Some(text) = input.text {
        session.send_text(&text).map_err(|e| e.to_string())?;
    }
    Ok(session.messages().to_vec())
}

/// Resolve a tapped topic chip. Returns the updated log.
pub async fn choose_chat_topic(state: &CoreState, topic: String) -> Result<Vec<Message>, String> {
    let mut session = state
        .chat()
        .try_lock()
        .map_err(|_| SendError::Busy.to_string())?;

    session
        .choose_topic(&topic)
        .await
        .map_err(|e| e.to_string())?;
    Ok(session.messages().to_vec())
}

/// Current message log for rendering.
pub async fn get_chat_messages(state: &CoreState) -> Result<Vec<Message>, String> {
    Ok(state.chat().lock().await.messages().to_vec())
}

/// Register an identified candidate into the pill list and drop the
/// confirmation bubble into the chat.
pub async fn accept_identified_pill(
    state: &CoreState,
    candidate: Candidate,
) -> Result<Vec<Message>, String> {
    let inserted = state
        .write_pills()
        .map_err(|e| e.to_string())?
        .add(&candidate.id, &candidate.name);
    if inserted {
        tracing::info!(id = %candidate.id, name = %candidate.name, "Pill registered from chat");
    }

    let mut session = state
        .chat()
        .try_lock()
        .map_err(|_| SendError::Busy.to_string())?;
    session.accept_candidate(&candidate);
    Ok(session.messages().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::MockPharmacistApi;
    use crate::models::MessageKind;
    use crate::notify::InProcessScheduler;
    use crate::places::MockPlacesClient;

    fn test_state() -> CoreState {
        CoreState::with_services(
            Arc::new(MockPharmacistApi::new()),
            Arc::new(MockPlacesClient::new(Vec::new())),
            Arc::new(InProcessScheduler::new()),
        )
    }

    #[tokio::test]
    async fn image_send_then_topic_choice_end_to_end() {
        let state = test_state();

        let log = send_chat_message(
            &state,
            ChatInput {
                text: None,
                image_uri: Some("file:///pill.jpg".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(log
            .iter()
            .any(|m| matches!(m.kind, MessageKind::Identify { .. })));

        let log = choose_chat_topic(&state, "복용방법".to_string()).await.unwrap();
        assert_eq!(log.last().unwrap().text().unwrap(), "식후 30분에 복용하세요.");
    }

    #[tokio::test]
    async fn send_while_session_is_held_is_rejected() {
        let state = test_state();
        let _held = state.chat().try_lock().unwrap();

        let err = send_chat_message(&state, ChatInput::default())
            .await
            .unwrap_err();
        assert!(err.contains("already being processed"));
    }

    #[tokio::test]
    async fn accepting_a_pill_registers_it_once() {
        let state = test_state();
        let candidate = Candidate {
            id: "0".to_string(),
            name: "타치온정".to_string(),
            score: 99.0,
        };

        let log = accept_identified_pill(&state, candidate.clone()).await.unwrap();
        assert!(matches!(
            log.last().unwrap().kind,
            MessageKind::PillResult { .. }
        ));
        assert_eq!(state.read_pills().unwrap().len(), 1);

        // Accepting the same candidate again is an idempotent registry no-op
        accept_identified_pill(&state, candidate).await.unwrap();
        assert_eq!(state.read_pills().unwrap().len(), 1);
    }
}
