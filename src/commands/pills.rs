//! Pill management screen commands.

use crate::api::UserProfile;
use crate::core_state::CoreState;
use crate::models::Pill;

/// Topics offered on the pill detail screen. The detail screen asks for
/// "효능" where the chat chips say "효과".
pub const DETAIL_TOPICS: [&str; 3] = ["금기사항", "복용방법", "효능"];

/// Registered pills, most recently added first.
pub fn get_pills(state: &CoreState) -> Result<Vec<Pill>, String> {
    Ok(state.read_pills().map_err(|e| e.to_string())?.pills().to_vec())
}

/// Remove one pill; returns the updated list.
pub fn remove_pill(state: &CoreState, id: String) -> Result<Vec<Pill>, String> {
    let mut registry = state.write_pills().map_err(|e| e.to_string())?;
    registry.remove(&id);
    Ok(registry.pills().to_vec())
}

/// Remove every registered pill.
pub fn clear_pills(state: &CoreState) -> Result<(), String> {
    state.write_pills().map_err(|e| e.to_string())?.clear();
    tracing::info!("Pill registry cleared");
    Ok(())
}

/// Pill detail screen: direct consultation lookup for a registered
/// pill, no chat session involved.
pub async fn get_pill_topic(
    state: &CoreState,
    pill_id: String,
    topic: String,
) -> Result<String, String> {
    let class_id: i64 = pill_id
        .parse()
        .map_err(|_| format!("Candidate id is not a numeric class id: {pill_id}"))?;

    state
        .pharmacist()
        .consult(class_id, &UserProfile::default_profile(), &[topic])
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::MockPharmacistApi;
    use crate::notify::InProcessScheduler;
    use crate::places::MockPlacesClient;

    fn test_state() -> CoreState {
        CoreState::with_services(
            Arc::new(MockPharmacistApi::new()),
            Arc::new(MockPlacesClient::new(Vec::new())),
            Arc::new(InProcessScheduler::new()),
        )
    }

    #[test]
    fn list_remove_clear_round_trip() {
        let state = test_state();
        state.write_pills().unwrap().add("0", "타치온정");
        state.write_pills().unwrap().add("1", "타이레놀정");

        let pills = get_pills(&state).unwrap();
        assert_eq!(pills.len(), 2);
        assert_eq!(pills[0].name, "타이레놀정");

        let pills = remove_pill(&state, "1".to_string()).unwrap();
        assert_eq!(pills.len(), 1);

        clear_pills(&state).unwrap();
        assert!(get_pills(&state).unwrap().is_empty());
    }

    #[tokio::test]
    async fn pill_topic_lookup_consults_directly() {
        let state = test_state();
        let advice = get_pill_topic(&state, "0".to_string(), "효능".to_string())
            .await
            .unwrap();
        assert_eq!(advice, "식후 30분에 복용하세요.");
    }

    #[tokio::test]
    async fn pill_topic_lookup_rejects_non_numeric_id() {
        let state = test_state();
        let err = get_pill_topic(&state, "abc".to_string(), "효능".to_string())
            .await
            .unwrap_err();
        assert!(err.contains("not a numeric class id"));
    }
}
