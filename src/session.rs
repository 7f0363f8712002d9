//! Message log shared by the chat-style sessions.
//!
//! Both the pill chat and the prescription chat keep an ordered,
//! append-only list of messages with one exception: the transient
//! `typing` placeholder is removed once the awaited response resolves.
//! Id assignment lives here so every session gets the same guarantee —
//! ids stay unique even when several messages land on the same
//! millisecond tick.

use chrono::Utc;

use crate::models::{Message, MessageId};

/// Returned when a send is attempted while another request is in flight.
/// Sends are rejected, never queued.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("A request is already being processed")]
    Busy,
}

/// Ordered message log with per-session id generation.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    seq: u32,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> MessageId {
        let id = MessageId::new(Utc::now().timestamp_millis(), self.seq);
        self.seq += 1;
        id
    }

    /// Append a message built from a freshly-assigned id.
    pub fn push_with(&mut self, build: impl FnOnce(MessageId) -> Message) -> MessageId {
        let id = self.next_id();
        self.messages.push(build(id));
        id
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) -> MessageId {
        let text = text.into();
        self.push_with(|id| Message::user_text(id, text))
    }

    pub fn push_assistant_text(&mut self, text: impl Into<String>) -> MessageId {
        let text = text.into();
        self.push_with(|id| Message::assistant_text(id, text))
    }

    pub fn push_user_image(
        &mut self,
        uri: impl Into<String>,
        caption: Option<String>,
    ) -> MessageId {
        let uri = uri.into();
        self.push_with(|id| Message::user_image(id, uri, caption))
    }

    pub fn push_typing(&mut self) -> MessageId {
        self.push_with(Message::typing)
    }

    /// Remove a message by id. Used for the typing placeholder only.
    pub fn remove(&mut self, id: MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn typing_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_typing()).count()
    }
}
