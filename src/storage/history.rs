//! Activity history

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Oldest entries are dropped beyond this
pub const MAX_HISTORY_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, details: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: action.into(),
            details,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Insert `entry` at the front and trim to [`MAX_HISTORY_ENTRIES`]
pub(crate) fn push_front(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.insert(0, entry);
    history.truncate(MAX_HISTORY_ENTRIES);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let mut history = Vec::new();
        for i in 0..(MAX_HISTORY_ENTRIES + 5) {
            push_front(&mut history, HistoryEntry::new(format!("action_{}", i), None));
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history[0].action, format!("action_{}", MAX_HISTORY_ENTRIES + 4));
        assert_eq!(history[MAX_HISTORY_ENTRIES - 1].action, "action_5");
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let json = serde_json::to_value(HistoryEntry::new("camera_paired", None)).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["action"], "camera_paired");
    }
}
