//! Pill identification chat session.
//!
//! A linear interaction protocol over the shared [`MessageLog`]:
//! photo in → identification result → topic chips → consultation text.
//! The session remembers only the most recent identification result; a
//! follow-up topic tap is resolved against it. A single `loading` flag
//! gates every user-initiated send, so at most one request is in flight
//! and the typing placeholder can never outlive its request.

use std::sync::Arc;

use serde::Serialize;

use crate::api::{ApiError, PharmacistApi, UserProfile};
use crate::models::{Candidate, IdentifyResult, Message};
use crate::session::{MessageLog, SendError};

// ═══════════════════════════════════════════
// Copy
// ═══════════════════════════════════════════

const WELCOME_TEXT: &str = "안녕하세요! 약 사진을 찍어서 보내주면 어떤 약인지 식별하고,\n원하는 정보(금기사항/복용방법/효과)를 알려드릴게요.";
const IMAGE_CAPTION: &str = "약 사진을 보냈어요.";
const PHOTO_NUDGE_TEXT: &str = "먼저 약 사진을 찍거나 갤러리에서 선택해주세요!";
const IDENTIFY_FAILED_TEXT: &str = "약 식별에 실패했어요. 잠시 후 다시 시도해주세요.";
const CONNECTIVITY_ERROR_TEXT: &str =
    "서버와 연결할 수 없습니다. 백엔드 서버가 켜져 있는지 확인해주세요.";
const MALFORMED_RESPONSE_TEXT: &str = "응답 형식이 올바르지 않습니다.";

/// Fixed topic chips offered after a successful identification.
pub const TOPICS: [&str; 3] = ["금기사항", "복용방법", "효과"];

fn best_match_prompt(name: &str) -> String {
    format!("가장 유력한 약은 \"{name}\"입니다.\n어떤 정보가 궁금하신가요?")
}

// ═══════════════════════════════════════════
// Session
// ═══════════════════════════════════════════

/// Observable session state. Guards are data-driven (the remembered
/// identification result), the phase exists for the frontend indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    AwaitingIdentify,
    AwaitingTopicChoice,
    AwaitingConsultation,
}

pub struct ChatSession {
    api: Arc<dyn PharmacistApi>,
    profile: UserProfile,
    log: MessageLog,
    last_identify: Option<IdentifyResult>,
    phase: SessionPhase,
    loading: bool,
}

impl ChatSession {
    pub fn new(api: Arc<dyn PharmacistApi>) -> Self {
        Self::with_profile(api, UserProfile::default_profile())
    }

    pub fn with_profile(api: Arc<dyn PharmacistApi>, profile: UserProfile) -> Self {
        let mut log = MessageLog::new();
        log.push_assistant_text(WELCOME_TEXT);
        Self {
            api,
            profile,
            log,
            last_identify: None,
            phase: SessionPhase::Idle,
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Most recent identification result, if any.
    pub fn last_identify(&self) -> Option<&IdentifyResult> {
        self.last_identify.as_ref()
    }

    pub fn topics() -> Vec<String> {
        TOPICS.iter().map(|t| t.to_string()).collect()
    }

    /// Submit a pill photo: image bubble, typing placeholder,
    /// identification, then the follow-up prompt plus topic chips when
    /// the detector picked a best match.
    pub async fn send_image(&mut self, uri: &str) -> Result<(), SendError> {
        if self.loading {
            return Err(SendError::Busy);
        }
        self.loading = true;
        self.phase = SessionPhase::AwaitingIdentify;

        self.log
            .push_user_image(uri, Some(IMAGE_CAPTION.to_string()));
        let typing_id = self.log.push_typing();

        let outcome = self.api.identify(uri).await;

        self.log.remove(typing_id);
        match outcome {
            Ok(identify) => {
                tracing::info!(
                    candidates = identify.candidates.len(),
                    has_match = identify.has_match(),
                    "Pill identification completed"
                );
                let best = identify.best_match.clone();
                self.last_identify = Some(identify.clone());
                self.log.push_with(|id| Message::identify(id, identify));

                if let Some(best) = best {
                    self.log.push_assistant_text(best_match_prompt(&best.name));
                    self.log
                        .push_with(|id| Message::topics(id, Self::topics()));
                    self.phase = SessionPhase::AwaitingTopicChoice;
                } else {
                    self.phase = SessionPhase::Idle;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Pill identification failed");
                self.log.push_assistant_text(IDENTIFY_FAILED_TEXT);
                self.phase = SessionPhase::Idle;
            }
        }
        self.loading = false;
        Ok(())
    }

    /// Resolve a tapped topic chip against the remembered identification.
    /// Without a remembered best match this is a silent no-op — a guard,
    /// not a failure.
    pub async fn choose_topic(&mut self, topic: &str) -> Result<(), SendError> {
        if self.loading {
            return Err(SendError::Busy);
        }
        let Some(best) = self
            .last_identify
            .as_ref()
            .and_then(|r| r.best_match.clone())
        else {
            return Ok(());
        };

        self.loading = true;
        self.phase = SessionPhase::AwaitingConsultation;

        self.log.push_user_text(topic);
        let typing_id = self.log.push_typing();

        let options = vec![topic.to_string()];
        let outcome = match best.id.parse::<i64>() {
            Ok(class_id) => self.api.consult(class_id, &self.profile, &options).await,
            Err(_) => Err(ApiError::InvalidClassId(best.id.clone())),
        };

        self.log.remove(typing_id);
        match outcome {
            Ok(advice) => {
                self.log.push_assistant_text(advice);
            }
            Err(ApiError::MalformedResponse(reason)) => {
                tracing::warn!(reason, "Consultation response was malformed");
                self.log.push_assistant_text(MALFORMED_RESPONSE_TEXT);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Consultation call failed");
                self.log.push_assistant_text(CONNECTIVITY_ERROR_TEXT);
            }
        }
        self.phase = SessionPhase::Idle;
        self.loading = false;
        Ok(())
    }

    /// Plain text with no pending photo: nudge toward submitting one.
    /// Empty input is ignored.
    pub fn send_text(&mut self, text: &str) -> Result<(), SendError> {
        if self.loading {
            return Err(SendError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.log.push_user_text(text);
        self.log.push_assistant_text(PHOTO_NUDGE_TEXT);
        Ok(())
    }

    /// Record the user accepting a candidate into their pill list. The
    /// registry insert happens at the command layer; the session only
    /// gets the confirmation bubble.
    pub fn accept_candidate(&mut self, candidate: &Candidate) {
        let (pill_id, name) = (candidate.id.clone(), candidate.name.clone());
        self.log
            .push_with(|id| Message::pill_result(id, pill_id, name));
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPharmacistApi;
    use crate::models::MessageKind;

    fn session(api: MockPharmacistApi) -> ChatSession {
        ChatSession::new(Arc::new(api))
    }

    fn kinds(session: &ChatSession) -> Vec<&'static str> {
        session
            .messages()
            .iter()
            .map(|m| match m.kind {
                MessageKind::Text { .. } => "text",
                MessageKind::Image { .. } => "image",
                MessageKind::Identify { .. } => "identify",
                MessageKind::Topic { .. } => "topic",
                MessageKind::Typing => "typing",
                MessageKind::PillResult { .. } => "pill_result",
                MessageKind::PrescriptionResult { .. } => "prescription_result",
            })
            .collect()
    }

    #[test]
    fn new_session_seeds_welcome_message() {
        let session = session(MockPharmacistApi::new());
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].text().unwrap().contains("안녕하세요"));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    // ── Image submission ──

    #[tokio::test]
    async fn image_submission_appends_identify_and_clears_typing() {
        let mut session = session(MockPharmacistApi::new());
        session.send_image("file:///pill.jpg").await.unwrap();

        // welcome, image, identify, best-match prompt, topic chips
        assert_eq!(kinds(&session), ["text", "image", "identify", "text", "topic"]);
        assert_eq!(session.log.typing_count(), 0);
        assert_eq!(session.phase(), SessionPhase::AwaitingTopicChoice);
        assert!(!session.is_loading());
        assert!(session.last_identify().unwrap().has_match());
    }

    #[tokio::test]
    async fn image_without_best_match_skips_topic_prompt() {
        let api = MockPharmacistApi::new().with_identify(IdentifyResult {
            extracted_text: String::new(),
            best_match: None,
            candidates: Vec::new(),
        });
        let mut session = session(api);
        session.send_image("file:///blurry.jpg").await.unwrap();

        assert_eq!(kinds(&session), ["text", "image", "identify"]);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn identify_failure_replaces_typing_with_error_text() {
        let mut session = session(MockPharmacistApi::new().failing_identify());
        session.send_image("file:///pill.jpg").await.unwrap();

        assert_eq!(kinds(&session), ["text", "image", "text"]);
        assert_eq!(
            session.messages().last().unwrap().text().unwrap(),
            IDENTIFY_FAILED_TEXT
        );
        assert_eq!(session.log.typing_count(), 0);
        assert!(!session.is_loading());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    // ── Topic choice ──

    #[tokio::test]
    async fn topic_without_identification_is_ignored() {
        let mut session = session(MockPharmacistApi::new());
        let before = session.messages().len();

        session.choose_topic("복용방법").await.unwrap();

        assert_eq!(session.messages().len(), before);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn topic_flow_sends_best_match_class_id() {
        let api = Arc::new(MockPharmacistApi::new().with_advice("식후 30분에 복용하세요."));
        let mut session = ChatSession::new(api.clone());
        session.send_image("file:///pill.jpg").await.unwrap();
        session.choose_topic("복용방법").await.unwrap();

        let messages = session.messages();
        let user_topic = &messages[messages.len() - 2];
        assert_eq!(user_topic.text().unwrap(), "복용방법");
        assert_eq!(
            messages.last().unwrap().text().unwrap(),
            "식후 30분에 복용하세요."
        );
        assert_eq!(session.log.typing_count(), 0);

        // The remembered best match's id is the class_id on the wire
        let recorded = api.recorded();
        assert_eq!(recorded.consult, vec![(0, vec!["복용방법".to_string()])]);
    }

    #[tokio::test]
    async fn consult_failure_appends_connectivity_text() {
        let mut session = session(MockPharmacistApi::new().failing_consult());
        session.send_image("file:///pill.jpg").await.unwrap();
        session.choose_topic("효과").await.unwrap();

        assert_eq!(
            session.messages().last().unwrap().text().unwrap(),
            CONNECTIVITY_ERROR_TEXT
        );
        assert_eq!(session.log.typing_count(), 0);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn malformed_consult_response_gets_its_own_text() {
        let mut session = session(MockPharmacistApi::new().malformed_consult());
        session.send_image("file:///pill.jpg").await.unwrap();
        session.choose_topic("금기사항").await.unwrap();

        assert_eq!(
            session.messages().last().unwrap().text().unwrap(),
            MALFORMED_RESPONSE_TEXT
        );
    }

    #[tokio::test]
    async fn non_numeric_candidate_id_is_treated_as_failure() {
        let api = MockPharmacistApi::new().with_identify(IdentifyResult {
            extracted_text: "X".to_string(),
            best_match: Some(Candidate {
                id: "not-a-number".to_string(),
                name: "무슨약".to_string(),
                score: 50.0,
            }),
            candidates: Vec::new(),
        });
        let mut session = session(api);
        session.send_image("file:///pill.jpg").await.unwrap();
        session.choose_topic("효과").await.unwrap();

        assert_eq!(
            session.messages().last().unwrap().text().unwrap(),
            CONNECTIVITY_ERROR_TEXT
        );
    }

    // ── Plain text + gating ──

    #[tokio::test]
    async fn plain_text_gets_photo_nudge_without_backend_call() {
        let api = MockPharmacistApi::new();
        let mut session = ChatSession::new(Arc::new(api));
        session.send_text("이 약 뭐예요?").unwrap();

        assert_eq!(kinds(&session), ["text", "text", "text"]);
        assert_eq!(
            session.messages().last().unwrap().text().unwrap(),
            PHOTO_NUDGE_TEXT
        );
    }

    #[test]
    fn empty_text_is_ignored() {
        let mut session = session(MockPharmacistApi::new());
        session.send_text("   ").unwrap();
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn sends_are_rejected_while_loading() {
        let mut session = session(MockPharmacistApi::new());
        session.loading = true;

        assert!(matches!(
            session.send_image("file:///pill.jpg").await,
            Err(SendError::Busy)
        ));
        assert!(matches!(session.send_text("hi"), Err(SendError::Busy)));
        assert!(matches!(
            session.choose_topic("효과").await,
            Err(SendError::Busy)
        ));
        // Rejected sends leave the log untouched
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn accept_candidate_appends_pill_result() {
        let mut session = session(MockPharmacistApi::new());
        session.accept_candidate(&Candidate {
            id: "0".to_string(),
            name: "타치온정".to_string(),
            score: 99.0,
        });

        match &session.messages().last().unwrap().kind {
            MessageKind::PillResult { id, name } => {
                assert_eq!(id, "0");
                assert_eq!(name, "타치온정");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn message_ids_are_unique_across_the_log() {
        let mut session = session(MockPharmacistApi::new());
        session.send_image("file:///pill.jpg").await.unwrap();
        session.choose_topic("복용방법").await.unwrap();

        let mut ids: Vec<_> = session.messages().iter().map(|m| m.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
