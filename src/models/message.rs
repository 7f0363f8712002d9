//! Chat message log entries.
//!
//! Messages are a tagged union over role and kind, serialized with a
//! `type` tag for the frontend renderer. Ids combine the creation
//! timestamp with a per-session sequence counter so two messages created
//! within the same millisecond tick still get distinct ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::identify::IdentifyResult;
use super::prescription::PrescriptionAnalysis;

// ═══════════════════════════════════════════
// MessageId
// ═══════════════════════════════════════════

/// Composite message id: `"{millis}-{seq}"`.
///
/// Ordering follows (millis, seq), which matches insertion order within
/// one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId {
    pub millis: i64,
    pub seq: u32,
}

impl MessageId {
    pub fn new(millis: i64, seq: u32) -> Self {
        Self { millis, seq }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid message id: {0}")]
pub struct ParseMessageIdError(String);

impl FromStr for MessageId {
    type Err = ParseMessageIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (millis, seq) = s
            .split_once('-')
            .ok_or_else(|| ParseMessageIdError(s.to_string()))?;
        Ok(Self {
            millis: millis
                .parse()
                .map_err(|_| ParseMessageIdError(s.to_string()))?,
            seq: seq
                .parse()
                .map_err(|_| ParseMessageIdError(s.to_string()))?,
        })
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════
// Message
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Message payload, one variant per bubble type the renderer knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    Text {
        text: String,
    },
    Image {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Identify {
        payload: IdentifyResult,
    },
    Topic {
        topics: Vec<String>,
    },
    /// Transient placeholder while an assistant response is in flight.
    Typing,
    PillResult {
        id: String,
        name: String,
    },
    PrescriptionResult {
        payload: PrescriptionAnalysis,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    pub fn user_text(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            kind: MessageKind::Text { text: text.into() },
        }
    }

    pub fn assistant_text(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::Text { text: text.into() },
        }
    }

    pub fn user_image(id: MessageId, uri: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            id,
            role: Role::User,
            kind: MessageKind::Image {
                uri: uri.into(),
                caption,
            },
        }
    }

    pub fn identify(id: MessageId, payload: IdentifyResult) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::Identify { payload },
        }
    }

    pub fn topics(id: MessageId, topics: Vec<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::Topic { topics },
        }
    }

    pub fn typing(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::Typing,
        }
    }

    pub fn pill_result(id: MessageId, pill_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::PillResult {
                id: pill_id.into(),
                name: name.into(),
            },
        }
    }

    pub fn prescription_result(id: MessageId, payload: PrescriptionAnalysis) -> Self {
        Self {
            id,
            role: Role::Assistant,
            kind: MessageKind::PrescriptionResult { payload },
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.kind, MessageKind::Typing)
    }

    /// Text content for `Text` messages, `None` for everything else.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Text { text } => Some(text),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_display_and_parse_round_trip() {
        let id = MessageId::new(1700000000123, 7);
        assert_eq!(id.to_string(), "1700000000123-7");
        assert_eq!("1700000000123-7".parse::<MessageId>().unwrap(), id);
    }

    #[test]
    fn message_id_rejects_garbage() {
        assert!("no-dash-here-x".parse::<MessageId>().is_err());
        assert!("123".parse::<MessageId>().is_err());
        assert!("abc-0".parse::<MessageId>().is_err());
    }

    #[test]
    fn message_id_ordering_matches_insertion_order() {
        let a = MessageId::new(100, 0);
        let b = MessageId::new(100, 1);
        let c = MessageId::new(101, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn message_id_serializes_as_string() {
        let json = serde_json::to_string(&MessageId::new(42, 3)).unwrap();
        assert_eq!(json, "\"42-3\"");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MessageId::new(42, 3));
    }

    #[test]
    fn kind_serializes_with_snake_case_type_tag() {
        let msg = Message::typing(MessageId::new(1, 0));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "typing");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["id"], "1-0");

        let msg = Message::pill_result(MessageId::new(1, 1), "0", "타치온정");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "pill_result");
        assert_eq!(json["name"], "타치온정");
    }

    #[test]
    fn text_accessor_only_matches_text_kind() {
        let text = Message::user_text(MessageId::new(1, 0), "hello");
        assert_eq!(text.text(), Some("hello"));

        let image = Message::user_image(MessageId::new(1, 1), "file:///a.jpg", None);
        assert_eq!(image.text(), None);
        assert!(!image.is_typing());
    }
}
