//! Maintenance records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{MaintenanceStatus, MaintenanceType};
use crate::error::{AppError, AppResult};

/// Scheduled or performed maintenance on an asset
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRecord {
    pub id: i32,
    pub asset_id: i32,
    pub maintenance_type: MaintenanceType,
    pub status: MaintenanceStatus,
    pub scheduled_date: NaiveDate,
    pub scheduled_by: Option<i32>,
    pub performed_date: Option<NaiveDate>,
    pub performed_by: Option<i32>,
    pub description: String,
    pub work_performed: String,
    pub parts_used: String,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub estimated_duration_minutes: Option<i32>,
    pub actual_duration_minutes: Option<i32>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    /// Open work whose scheduled date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.scheduled_date < today
    }

    /// Ensure the record may move to `next`
    pub fn check_transition(&self, next: MaintenanceStatus) -> AppResult<()> {
        let allowed = match (self.status, next) {
            (MaintenanceStatus::Scheduled, MaintenanceStatus::InProgress) => true,
            (
                MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress,
                MaintenanceStatus::Completed | MaintenanceStatus::Cancelled,
            ) => true,
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(AppError::BusinessRule(format!(
                "Maintenance #{} cannot move from {} to {}",
                self.id,
                self.status.label(),
                next.label()
            )))
        }
    }
}

/// Record joined with asset tag and user names
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MaintenanceListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: MaintenanceRecord,
    pub asset_tag: String,
    pub scheduled_by_name: Option<String>,
    pub performed_by_name: Option<String>,
}

/// Maintenance record as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaintenanceView {
    #[serde(flatten)]
    pub listing: MaintenanceListing,
    pub is_overdue: bool,
}

impl MaintenanceView {
    pub fn new(listing: MaintenanceListing, today: NaiveDate) -> Self {
        let is_overdue = listing.record.is_overdue(today);
        Self { listing, is_overdue }
    }
}

/// Schedule maintenance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleMaintenance {
    /// Tag of the asset to maintain
    #[validate(length(min = 1, message = "Asset tag is required"))]
    pub asset_tag: String,
    pub maintenance_type: MaintenanceType,
    pub scheduled_date: NaiveDate,
    #[validate(length(min = 1, message = "Describe the maintenance work to be performed"))]
    pub description: String,
    #[validate(range(min = 1, message = "Estimated duration must be positive"))]
    pub estimated_duration_minutes: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
}

impl ScheduleMaintenance {
    /// Field checks plus the one temporal rule: no scheduling in the past
    pub fn clean(mut self, today: NaiveDate) -> AppResult<Self> {
        self.asset_tag = self.asset_tag.trim().to_uppercase();
        self.description = self.description.trim().to_string();
        self.validate()?;
        if self.scheduled_date < today {
            return Err(AppError::Validation(
                "Scheduled date cannot be in the past.".to_string(),
            ));
        }
        check_cost(self.cost)?;
        Ok(self)
    }
}

/// Complete maintenance request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CompleteMaintenance {
    /// Defaults to today
    pub performed_date: Option<NaiveDate>,
    #[serde(default)]
    pub work_performed: String,
    #[serde(default)]
    pub parts_used: String,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    #[validate(range(min = 1, message = "Actual duration must be positive"))]
    pub actual_duration_minutes: Option<i32>,
    /// Also becomes the asset's next maintenance date
    pub next_maintenance_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl CompleteMaintenance {
    /// Resolve the performed date and check it against the follow-up date
    pub fn clean(mut self, today: NaiveDate) -> AppResult<Self> {
        self.validate()?;
        check_cost(self.cost)?;
        let performed = *self.performed_date.get_or_insert(today);
        if performed > today {
            return Err(AppError::Validation(
                "Performed date cannot be in the future.".to_string(),
            ));
        }
        if let Some(next) = self.next_maintenance_date {
            if next <= performed {
                return Err(AppError::Validation(
                    "Next maintenance date must be after last maintenance date.".to_string(),
                ));
            }
        }
        Ok(self)
    }
}

/// Cancel maintenance request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CancelMaintenance {
    pub reason: Option<String>,
}

/// Maintenance list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MaintenanceQuery {
    pub asset_tag: Option<String>,
    pub status: Option<MaintenanceStatus>,
    pub maintenance_type: Option<MaintenanceType>,
    /// Only open records scheduled before today
    pub overdue: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn check_cost(cost: Option<Decimal>) -> AppResult<()> {
    match cost {
        Some(c) if c.is_sign_negative() => {
            Err(AppError::Validation("Cost cannot be negative.".to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(status: MaintenanceStatus, scheduled_date: NaiveDate) -> MaintenanceRecord {
        let now = Utc::now();
        MaintenanceRecord {
            id: 12,
            asset_id: 1,
            maintenance_type: MaintenanceType::Preventive,
            status,
            scheduled_date,
            scheduled_by: Some(1),
            performed_date: None,
            performed_by: None,
            description: "Battery check".to_string(),
            work_performed: String::new(),
            parts_used: String::new(),
            cost: None,
            estimated_duration_minutes: Some(90),
            actual_duration_minutes: None,
            next_maintenance_date: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn schedule(scheduled_date: NaiveDate) -> ScheduleMaintenance {
        ScheduleMaintenance {
            asset_tag: "ups-001".to_string(),
            maintenance_type: MaintenanceType::Inspection,
            scheduled_date,
            description: "Quarterly inspection".to_string(),
            estimated_duration_minutes: None,
            cost: None,
        }
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2024, 3, 10);
        let yesterday = today - Duration::days(1);
        assert!(record(MaintenanceStatus::Scheduled, yesterday).is_overdue(today));
        assert!(record(MaintenanceStatus::InProgress, yesterday).is_overdue(today));
        assert!(!record(MaintenanceStatus::Scheduled, today).is_overdue(today));
        assert!(!record(MaintenanceStatus::Completed, yesterday).is_overdue(today));
        assert!(!record(MaintenanceStatus::Cancelled, yesterday).is_overdue(today));
    }

    #[test]
    fn test_schedule_in_the_past_rejected() {
        let today = date(2024, 3, 10);
        match schedule(today - Duration::days(1)).clean(today) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Scheduled date cannot be in the past."),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_schedule_today_or_later_accepted() {
        let today = date(2024, 3, 10);
        let cleaned = schedule(today + Duration::days(1)).clean(today).unwrap();
        assert_eq!(cleaned.asset_tag, "UPS-001");
        assert!(schedule(today).clean(today).is_ok());
    }

    #[test]
    fn test_schedule_rejects_negative_cost_and_empty_description() {
        let today = date(2024, 3, 10);
        let mut s = schedule(today);
        s.cost = Some(Decimal::new(-100, 2));
        assert!(s.clean(today).is_err());

        let mut s = schedule(today);
        s.description = "  ".to_string();
        assert!(s.clean(today).is_err());
    }

    #[test]
    fn test_transitions() {
        let today = date(2024, 3, 10);
        let scheduled = record(MaintenanceStatus::Scheduled, today);
        assert!(scheduled.check_transition(MaintenanceStatus::InProgress).is_ok());
        assert!(scheduled.check_transition(MaintenanceStatus::Completed).is_ok());
        assert!(scheduled.check_transition(MaintenanceStatus::Cancelled).is_ok());

        let in_progress = record(MaintenanceStatus::InProgress, today);
        assert!(in_progress.check_transition(MaintenanceStatus::InProgress).is_err());
        assert!(in_progress.check_transition(MaintenanceStatus::Completed).is_ok());

        let done = record(MaintenanceStatus::Completed, today);
        assert!(matches!(
            done.check_transition(MaintenanceStatus::Cancelled),
            Err(AppError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_complete_defaults_performed_date() {
        let today = date(2024, 3, 10);
        let cleaned = CompleteMaintenance::default().clean(today).unwrap();
        assert_eq!(cleaned.performed_date, Some(today));

        let bad = CompleteMaintenance {
            next_maintenance_date: Some(today),
            ..Default::default()
        };
        assert!(bad.clean(today).is_err());

        let future = CompleteMaintenance {
            performed_date: Some(today + Duration::days(2)),
            ..Default::default()
        };
        assert!(future.clean(today).is_err());
    }
}
