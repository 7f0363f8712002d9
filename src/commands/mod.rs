//! Screen-facing command layer.
//!
//! Thin async wrappers over [`CoreState`](crate::core_state::CoreState):
//! one module per screen, every function returning `Result<T, String>`
//! so the shell can show the error text directly. Session commands take
//! the session lock with `try_lock` — a send that arrives while another
//! request is in flight is rejected, never queued.

pub mod chat;
pub mod pharmacy;
pub mod pills;
pub mod prescription;
pub mod reminders;

/// Health check — verifies the core is responsive.
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}
