//! Aggregate views: health summary, status counts, dashboard

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{
    asset::AssetView,
    asset_log::AssetLogEntry,
    enums::{AssetPriority, AssetStatus},
    maintenance::MaintenanceView,
    reference::AssetTypeCount,
};

/// Horizon of the "due this week" counter, in days from today
pub const DUE_SOON_DAYS: i64 = 7;

/// The columns the health summary needs from each asset
#[derive(Debug, Clone, FromRow)]
pub struct AssetHealthRow {
    pub asset_tag: String,
    pub name: String,
    pub status: AssetStatus,
    pub priority: AssetPriority,
    pub next_maintenance: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusSummary {
    pub total: i64,
    pub active: i64,
    pub maintenance: i64,
    pub faulty: i64,
    pub standby: i64,
    pub decommissioned: i64,
}

impl StatusSummary {
    pub fn add(&mut self, status: AssetStatus) {
        self.total += 1;
        match status {
            AssetStatus::Active => self.active += 1,
            AssetStatus::Maintenance => self.maintenance += 1,
            AssetStatus::Faulty => self.faulty += 1,
            AssetStatus::Standby => self.standby += 1,
            AssetStatus::Decommissioned => self.decommissioned += 1,
        }
    }
}

/// Critical asset that is faulty or due for maintenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CriticalIssue {
    pub asset_tag: String,
    pub name: String,
    pub status: AssetStatus,
    pub next_maintenance: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthSummary {
    pub total_assets: i64,
    pub status_summary: StatusSummary,
    pub critical_issues: Vec<CriticalIssue>,
    /// Active or standby assets whose next maintenance is before today
    pub overdue_maintenance: i64,
    /// Next maintenance between today and today + 7 days, inclusive
    pub due_this_week: i64,
    /// Share of active assets, one decimal; 0 without assets
    pub health_percentage: f64,
}

impl HealthSummary {
    pub fn compute(rows: &[AssetHealthRow], today: NaiveDate) -> Self {
        let mut status_summary = StatusSummary::default();
        let mut critical_issues = Vec::new();
        let mut overdue_maintenance = 0;
        let mut due_this_week = 0;
        let week_end = today + Duration::days(DUE_SOON_DAYS);

        for row in rows {
            status_summary.add(row.status);

            let due = row.next_maintenance.map(|d| d <= today).unwrap_or(false);
            if row.priority == AssetPriority::Critical
                && row.status != AssetStatus::Decommissioned
                && (row.status == AssetStatus::Faulty || due)
            {
                critical_issues.push(CriticalIssue {
                    asset_tag: row.asset_tag.clone(),
                    name: row.name.clone(),
                    status: row.status,
                    next_maintenance: row.next_maintenance,
                });
            }

            if let Some(next) = row.next_maintenance {
                if next < today && matches!(row.status, AssetStatus::Active | AssetStatus::Standby) {
                    overdue_maintenance += 1;
                }
                if next >= today && next <= week_end {
                    due_this_week += 1;
                }
            }
        }

        let health_percentage = health_percentage(status_summary.active, status_summary.total);

        Self {
            total_assets: status_summary.total,
            status_summary,
            critical_issues,
            overdue_maintenance,
            due_this_week,
            health_percentage,
        }
    }
}

pub fn health_percentage(active: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = active as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Landing page data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub total_assets: i64,
    pub active_assets: i64,
    pub maintenance_assets: i64,
    pub faulty_assets: i64,
    pub assets_by_type: Vec<AssetTypeCount>,
    pub recent_maintenance: Vec<MaintenanceView>,
    pub maintenance_due: Vec<AssetView>,
    pub recent_logs: Vec<AssetLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(
        tag: &str,
        status: AssetStatus,
        priority: AssetPriority,
        next: Option<NaiveDate>,
    ) -> AssetHealthRow {
        AssetHealthRow {
            asset_tag: tag.to_string(),
            name: format!("{} unit", tag),
            status,
            priority,
            next_maintenance: next,
        }
    }

    #[test]
    fn test_empty_inventory() {
        let summary = HealthSummary::compute(&[], date(2024, 1, 1));
        assert_eq!(summary.total_assets, 0);
        assert_eq!(summary.health_percentage, 0.0);
        assert!(summary.critical_issues.is_empty());
    }

    #[test]
    fn test_three_active_one_faulty_is_75_percent() {
        let rows = vec![
            row("A-1", AssetStatus::Active, AssetPriority::Low, None),
            row("A-2", AssetStatus::Active, AssetPriority::Low, None),
            row("A-3", AssetStatus::Active, AssetPriority::Low, None),
            row("F-1", AssetStatus::Faulty, AssetPriority::Low, None),
        ];
        let summary = HealthSummary::compute(&rows, date(2024, 1, 1));
        assert_eq!(summary.health_percentage, 75.0);
        assert_eq!(
            summary.status_summary,
            StatusSummary {
                total: 4,
                active: 3,
                faulty: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(health_percentage(2, 3), 66.7);
        assert_eq!(health_percentage(1, 3), 33.3);
    }

    #[test]
    fn test_critical_issues() {
        let today = date(2024, 5, 20);
        let rows = vec![
            row("UPS-1", AssetStatus::Faulty, AssetPriority::Critical, None),
            row("UPS-2", AssetStatus::Active, AssetPriority::Critical, Some(today)),
            row("UPS-3", AssetStatus::Active, AssetPriority::Critical, Some(date(2024, 6, 1))),
            row("UPS-4", AssetStatus::Decommissioned, AssetPriority::Critical, Some(date(2024, 1, 1))),
            row("GEN-1", AssetStatus::Faulty, AssetPriority::High, None),
        ];
        let summary = HealthSummary::compute(&rows, today);
        let tags: Vec<_> = summary.critical_issues.iter().map(|c| c.asset_tag.as_str()).collect();
        assert_eq!(tags, vec!["UPS-1", "UPS-2"]);
    }

    #[test]
    fn test_overdue_and_due_this_week() {
        let today = date(2024, 5, 20);
        let rows = vec![
            row("A", AssetStatus::Active, AssetPriority::Low, Some(date(2024, 5, 19))),
            row("B", AssetStatus::Standby, AssetPriority::Low, Some(date(2024, 5, 1))),
            row("C", AssetStatus::Faulty, AssetPriority::Low, Some(date(2024, 5, 1))),
            row("D", AssetStatus::Active, AssetPriority::Low, Some(today)),
            row("E", AssetStatus::Active, AssetPriority::Low, Some(date(2024, 5, 27))),
            row("F", AssetStatus::Active, AssetPriority::Low, Some(date(2024, 5, 28))),
        ];
        let summary = HealthSummary::compute(&rows, today);
        assert_eq!(summary.overdue_maintenance, 2);
        assert_eq!(summary.due_this_week, 2);
    }
}
