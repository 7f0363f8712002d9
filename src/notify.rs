//! Local notification scheduler seam.
//!
//! The device shell owns the real notification system; this crate only
//! talks to it through [`NotificationScheduler`]. `InProcessScheduler`
//! keeps scheduled notifications in a map — enough for desktop dev runs
//! and for tests that assert the at-most-one-live-handle invariant.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to a scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors from the notification scheduler.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("알림 권한이 필요해요. 설정에서 알림을 허용해주세요.")]
    PermissionDenied,
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

/// Daily recurring local notification scheduler.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Schedule a recurring daily notification at hour/minute local time.
    async fn schedule_daily(
        &self,
        hour: u32,
        minute: u32,
        title: &str,
        body: &str,
    ) -> Result<NotificationId, NotifyError>;

    /// Cancel a scheduled notification. Cancelling an unknown handle is
    /// a no-op, matching the OS scheduler.
    async fn cancel(&self, id: NotificationId) -> Result<(), NotifyError>;
}

/// A notification as held by [`InProcessScheduler`].
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub body: String,
}

/// In-memory scheduler. Tracks live notifications and every cancelled
/// handle, which is what the preset tests assert on.
#[derive(Default)]
pub struct InProcessScheduler {
    live: Mutex<HashMap<NotificationId, ScheduledNotification>>,
    cancelled: Mutex<Vec<NotificationId>>,
    deny: AtomicBool,
}

impl InProcessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that simulates a notification-permission denial.
    pub fn denying() -> Self {
        let scheduler = Self::default();
        scheduler.deny.store(true, Ordering::Relaxed);
        scheduler
    }

    pub fn live(&self) -> Vec<ScheduledNotification> {
        self.live
            .lock()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn get(&self, id: NotificationId) -> Option<ScheduledNotification> {
        self.live.lock().ok()?.get(&id).cloned()
    }

    pub fn cancelled(&self) -> Vec<NotificationId> {
        self.cancelled.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationScheduler for InProcessScheduler {
    async fn schedule_daily(
        &self,
        hour: u32,
        minute: u32,
        title: &str,
        body: &str,
    ) -> Result<NotificationId, NotifyError> {
        if self.deny.load(Ordering::Relaxed) {
            return Err(NotifyError::PermissionDenied);
        }
        let id = NotificationId::new();
        let mut live = self
            .live
            .lock()
            .map_err(|_| NotifyError::Scheduler("Internal lock error".to_string()))?;
        live.insert(
            id,
            ScheduledNotification {
                id,
                hour,
                minute,
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        tracing::debug!(%id, hour, minute, "Daily notification scheduled");
        Ok(id)
    }

    async fn cancel(&self, id: NotificationId) -> Result<(), NotifyError> {
        let mut live = self
            .live
            .lock()
            .map_err(|_| NotifyError::Scheduler("Internal lock error".to_string()))?;
        live.remove(&id);
        drop(live);
        if let Ok(mut cancelled) = self.cancelled.lock() {
            cancelled.push(id);
        }
        tracing::debug!(%id, "Notification cancelled");
        Ok(())
    }
}
