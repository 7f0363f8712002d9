use std::env;

/// Application-level constants
pub const APP_NAME: &str = "Pillchat";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Radius for "pharmacies around me" nearby search, in meters.
pub const NEARBY_RADIUS_M: u32 = 2_000;

/// Location-bias radius for keyword search, in meters.
pub const KEYWORD_BIAS_RADIUS_M: u32 = 5_000;

/// Base URL of the AI pharmacist backend.
pub fn backend_url() -> String {
    env::var("PILLCHAT_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Places provider API key. Empty when not configured; provider calls
/// then fail with a REQUEST_DENIED status surfaced to the user.
pub fn places_api_key() -> String {
    env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default()
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,pillchat=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_pillchat() {
        assert_eq!(APP_NAME, "Pillchat");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn keyword_bias_is_wider_than_nearby_radius() {
        assert!(KEYWORD_BIAS_RADIUS_M > NEARBY_RADIUS_M);
    }
}
