//! Prescription analysis chat session.
//!
//! Single-purpose sibling of the pill chat: only image submission is
//! meaningful. The photo goes to the analysis endpoint with a mode flag
//! (pharmacy bag, hospital prescription, or food) and the structured
//! payload comes back as its own message type.

use std::sync::Arc;

use crate::api::PharmacistApi;
use crate::models::{AnalysisMode, Message};
use crate::session::{MessageLog, SendError};

const DEFAULT_WELCOME_TEXT: &str =
    "처방전이나 약봉투 사진을 올려주시면 복용 정보를 분석해드릴게요.";
const ANALYSIS_DONE_TEXT: &str = "처방전 분석이 완료되었습니다. 복용 스케줄을 확인해주세요.";
const UNCLEAR_RESULT_TEXT: &str = "분석 결과가 명확하지 않습니다.";
const ANALYSIS_FAILED_TEXT: &str = "처방전 분석에 실패했어요. 잠시 후 다시 시도해주세요.";
const PHOTO_NUDGE_TEXT: &str = "처방전(또는 약봉투) 사진을 먼저 올려주시면 분석해드릴게요.";

pub struct PrescriptionSession {
    api: Arc<dyn PharmacistApi>,
    log: MessageLog,
    loading: bool,
}

impl PrescriptionSession {
    pub fn new(api: Arc<dyn PharmacistApi>) -> Self {
        Self::with_welcome(api, DEFAULT_WELCOME_TEXT)
    }

    /// Each entry screen seeds its own greeting.
    pub fn with_welcome(api: Arc<dyn PharmacistApi>, welcome_text: &str) -> Self {
        let mut log = MessageLog::new();
        log.push_assistant_text(welcome_text);
        Self {
            api,
            log,
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submit a document photo for analysis. A recognized medication
    /// list becomes a `prescription_result` bubble plus a success text;
    /// anything else degrades to a static "unclear" text.
    pub async fn submit_image(&mut self, uri: &str, mode: AnalysisMode) -> Result<(), SendError> {
        if self.loading {
            return Err(SendError::Busy);
        }
        self.loading = true;

        self.log
            .push_user_image(uri, Some(mode.caption().to_string()));
        let typing_id = self.log.push_typing();

        let outcome = self.api.analyze_prescription(uri, mode).await;

        self.log.remove(typing_id);
        match outcome {
            Ok(analysis) if analysis.has_recognized_medications() => {
                tracing::info!(?mode, "Prescription analysis recognized medications");
                self.log
                    .push_with(|id| Message::prescription_result(id, analysis));
                self.log.push_assistant_text(ANALYSIS_DONE_TEXT);
            }
            Ok(_) => {
                tracing::info!(?mode, "Prescription analysis returned no medication fields");
                self.log.push_assistant_text(UNCLEAR_RESULT_TEXT);
            }
            Err(err) => {
                tracing::warn!(error = %err, ?mode, "Prescription analysis failed");
                self.log.push_assistant_text(ANALYSIS_FAILED_TEXT);
            }
        }
        self.loading = false;
        Ok(())
    }

    /// Plain text without a pending photo: nudge toward uploading one.
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
}
