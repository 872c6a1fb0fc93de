//! Append-only audit trail of asset events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{AssetStatus, LogEventType};

/// Shown in place of a missing assignee
pub const UNASSIGNED: &str = "Unassigned";

/// Stored audit log row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssetLog {
    pub id: i32,
    pub asset_id: i32,
    pub event_type: LogEventType,
    pub description: String,
    /// Acting user, NULL once that user is gone
    pub user_id: Option<i32>,
    pub timestamp: DateTime<Utc>,
    /// Empty when not applicable
    pub old_value: String,
    pub new_value: String,
}

/// Log row joined with asset tag and acting user's name
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetLogEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: AssetLog,
    pub asset_tag: String,
    pub user_name: Option<String>,
}

/// Log row about to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssetLog {
    pub event_type: LogEventType,
    pub description: String,
    pub old_value: String,
    pub new_value: String,
}

impl NewAssetLog {
    pub fn new(event_type: LogEventType, description: impl Into<String>) -> Self {
        Self {
            event_type,
            description: description.into(),
            old_value: String::new(),
            new_value: String::new(),
        }
    }

    pub fn with_values(mut self, old_value: impl Into<String>, new_value: impl Into<String>) -> Self {
        self.old_value = old_value.into();
        self.new_value = new_value.into();
        self
    }

    pub fn created() -> Self {
        Self::new(LogEventType::Created, "Asset created")
    }

    /// Names are the assignees' full names, `None` meaning unassigned
    pub fn assignment(old_name: Option<&str>, new_name: Option<&str>) -> Self {
        let old_name = old_name.unwrap_or(UNASSIGNED);
        let new_name = new_name.unwrap_or(UNASSIGNED);
        Self::new(
            LogEventType::AssignmentChange,
            format!("Asset reassigned from {} to {}", old_name, new_name),
        )
        .with_values(old_name, new_name)
    }

    pub fn status_change(old: AssetStatus, new: AssetStatus) -> Self {
        Self::new(
            LogEventType::StatusChange,
            format!("Status changed from {} to {}", old.label(), new.label()),
        )
        .with_values(old.as_str(), new.as_str())
    }

    pub fn updated(changed_fields: &[&str]) -> Self {
        let description = if changed_fields.is_empty() {
            "Asset information updated".to_string()
        } else {
            format!("Asset information updated ({})", changed_fields.join(", "))
        };
        Self::new(LogEventType::Updated, description)
    }
}

/// Filters for the global log listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AssetLogQuery {
    pub event_type: Option<LogEventType>,
    /// Acting user
    pub user_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_between_users() {
        let log = NewAssetLog::assignment(Some("Alice Nakato"), Some("Brian Okello"));
        assert_eq!(log.event_type, LogEventType::AssignmentChange);
        assert_eq!(log.old_value, "Alice Nakato");
        assert_eq!(log.new_value, "Brian Okello");
        assert_eq!(log.description, "Asset reassigned from Alice Nakato to Brian Okello");
    }

    #[test]
    fn test_assignment_to_and_from_nobody() {
        let log = NewAssetLog::assignment(None, Some("Brian Okello"));
        assert_eq!(log.old_value, UNASSIGNED);
        assert_eq!(log.description, "Asset reassigned from Unassigned to Brian Okello");

        let log = NewAssetLog::assignment(Some("Brian Okello"), None);
        assert_eq!(log.new_value, UNASSIGNED);
    }

    #[test]
    fn test_status_change_records_slugs() {
        let log = NewAssetLog::status_change(AssetStatus::Active, AssetStatus::Faulty);
        assert_eq!(log.old_value, "active");
        assert_eq!(log.new_value, "faulty");
        assert_eq!(log.description, "Status changed from Active to Faulty");
    }

    #[test]
    fn test_updated_lists_fields() {
        assert_eq!(
            NewAssetLog::updated(&["name", "notes"]).description,
            "Asset information updated (name, notes)"
        );
        assert_eq!(NewAssetLog::updated(&[]).description, "Asset information updated");
        assert!(NewAssetLog::created().old_value.is_empty());
    }
}
