//! Pillchat — transport-agnostic core of a medication companion app.
//!
//! The shell (screens, navigation, pickers, the map) stays thin: it owns
//! a [`core_state::CoreState`] and calls the functions in [`commands`].
//! Everything stateful lives here — the pill chat, the prescription
//! chat, the pill registry, the reminder presets, and the pharmacy
//! locator. Nothing is persisted; state lives for the process.

pub mod api;
pub mod chat;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod models;
pub mod notify;
pub mod pharmacy;
pub mod places;
pub mod prescription;
pub mod registry;
pub mod reminders;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a shell that has no subscriber of its own.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
