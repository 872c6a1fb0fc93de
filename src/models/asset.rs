//! Asset model, derived state and edit validation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    asset_log::AssetLogEntry,
    enums::{AssetPriority, AssetStatus},
    maintenance::MaintenanceView,
    reference::Location,
    specification::AssetSpecification,
};
use crate::error::{AppError, AppResult};

/// Warranty expiring within this many days (inclusive) is "Expiring Soon"
pub const WARRANTY_WARNING_DAYS: i64 = 30;

/// Asset record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
    /// Unique uppercase tag, e.g. UPS-001
    pub asset_tag: String,
    pub serial_number: Option<String>,
    /// Common name or hostname
    pub name: String,
    pub asset_type_id: i32,
    pub manufacturer_id: i32,
    pub model_number: String,
    pub location_id: i32,
    /// Employee responsible for the asset
    pub assigned_to_id: Option<i32>,
    pub status: AssetStatus,
    pub priority: AssetPriority,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
    pub description: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Maintenance is due when the next maintenance date is today or earlier
    pub fn is_maintenance_due(&self, today: NaiveDate) -> bool {
        maintenance_due(self.next_maintenance, today)
    }

    pub fn warranty_status(&self, today: NaiveDate) -> WarrantyStatus {
        WarrantyStatus::evaluate(self.warranty_expiry, today)
    }

    pub fn derived_state(&self, today: NaiveDate) -> AssetDerivedState {
        AssetDerivedState {
            is_maintenance_due: self.is_maintenance_due(today),
            warranty_status: self.warranty_status(today),
        }
    }
}

pub fn maintenance_due(next_maintenance: Option<NaiveDate>, today: NaiveDate) -> bool {
    next_maintenance.map(|d| d <= today).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Derived state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WarrantyStatus {
    Unknown,
    Expired,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    Active,
}

impl WarrantyStatus {
    /// Only an expiry strictly before today is expired; expiry today is still
    /// inside the warning window.
    pub fn evaluate(warranty_expiry: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(expiry) = warranty_expiry else {
            return WarrantyStatus::Unknown;
        };
        if expiry < today {
            WarrantyStatus::Expired
        } else if (expiry - today).num_days() <= WARRANTY_WARNING_DAYS {
            WarrantyStatus::ExpiringSoon
        } else {
            WarrantyStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::Unknown => "Unknown",
            WarrantyStatus::Expired => "Expired",
            WarrantyStatus::ExpiringSoon => "Expiring Soon",
            WarrantyStatus::Active => "Active",
        }
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Values computed from stored dates at read time, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct AssetDerivedState {
    pub is_maintenance_due: bool,
    pub warranty_status: WarrantyStatus,
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Asset joined with the names of its references
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub asset: Asset,
    pub asset_type_name: String,
    pub manufacturer_name: String,
    pub location_name: String,
    pub assigned_to_name: Option<String>,
}

/// Asset as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetView {
    #[serde(flatten)]
    pub listing: AssetListing,
    #[serde(flatten)]
    pub derived: AssetDerivedState,
}

impl AssetView {
    pub fn new(listing: AssetListing, today: NaiveDate) -> Self {
        let derived = listing.asset.derived_state(today);
        Self { listing, derived }
    }
}

/// Full asset page: record, specifications, recent maintenance and logs
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetDetails {
    pub asset: AssetView,
    pub specifications: Vec<AssetSpecification>,
    pub maintenance_records: Vec<MaintenanceView>,
    pub recent_logs: Vec<AssetLogEntry>,
}

/// Specifications worth having at hand while handling an incident
pub const INCIDENT_SPECIFICATION_NAMES: [&str; 7] = [
    "Power Rating",
    "Voltage",
    "Current",
    "Temperature",
    "Pressure",
    "Flow Rate",
    "Capacity",
];

/// Rows carried by the incident context
pub const INCIDENT_MAINTENANCE_LIMIT: i64 = 3;
pub const INCIDENT_LOG_LIMIT: i64 = 5;

/// What a responder needs to know about an asset when an incident is raised
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IncidentContext {
    pub asset: AssetView,
    pub is_critical: bool,
    pub location: Location,
    pub recent_maintenance: Vec<MaintenanceView>,
    pub recent_logs: Vec<AssetLogEntry>,
    pub critical_specifications: Vec<AssetSpecification>,
}

impl IncidentContext {
    pub fn new(
        asset: AssetView,
        location: Location,
        recent_maintenance: Vec<MaintenanceView>,
        recent_logs: Vec<AssetLogEntry>,
        specifications: Vec<AssetSpecification>,
    ) -> Self {
        Self {
            is_critical: asset.listing.asset.priority == AssetPriority::Critical,
            asset,
            location,
            recent_maintenance,
            recent_logs,
            critical_specifications: incident_specifications(specifications),
        }
    }
}

/// Keeps the specifications named in [`INCIDENT_SPECIFICATION_NAMES`], exact match
pub fn incident_specifications(specifications: Vec<AssetSpecification>) -> Vec<AssetSpecification> {
    specifications
        .into_iter()
        .filter(|s| INCIDENT_SPECIFICATION_NAMES.contains(&s.specification_name.as_str()))
        .collect()
}

/// Asset list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    pub status: Option<AssetStatus>,
    pub priority: Option<AssetPriority>,
    /// Asset type name
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    /// Location name
    pub location: Option<String>,
    pub assigned_to: Option<i32>,
    /// Only assets whose maintenance is due
    pub maintenance_due: Option<bool>,
    /// Search tag, name, serial number and description
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// ---------------------------------------------------------------------------
// Create / edit
// ---------------------------------------------------------------------------

/// Full set of editable asset fields, used for both create and edit
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssetInput {
    #[validate(length(min = 1, max = 100, message = "Asset tag must be 1 to 100 characters"))]
    pub asset_tag: String,
    #[validate(length(max = 100, message = "Serial number must be at most 100 characters"))]
    pub serial_number: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    pub asset_type_id: i32,
    pub manufacturer_id: i32,
    #[validate(length(max = 100, message = "Model number must be at most 100 characters"))]
    #[serde(default)]
    pub model_number: String,
    pub location_id: i32,
    pub assigned_to_id: Option<i32>,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub priority: AssetPriority,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
}

impl AssetInput {
    /// Normalize and check everything that needs no database access.
    ///
    /// The tag is trimmed and uppercased, a blank serial number becomes
    /// `None`, then field lengths and date relationships are checked.
    pub fn clean(mut self) -> AppResult<Self> {
        self.asset_tag = self.asset_tag.trim().to_uppercase();
        self.name = self.name.trim().to_string();
        self.serial_number = self
            .serial_number
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.model_number = self.model_number.trim().to_string();

        self.validate()?;
        self.validate_dates()?;
        Ok(self)
    }

    pub fn validate_dates(&self) -> AppResult<()> {
        if let (Some(purchase), Some(installation)) = (self.purchase_date, self.installation_date) {
            if installation < purchase {
                return Err(AppError::Validation(
                    "Installation date cannot be before purchase date.".to_string(),
                ));
            }
        }
        if let (Some(purchase), Some(warranty)) = (self.purchase_date, self.warranty_expiry) {
            if warranty < purchase {
                return Err(AppError::Validation(
                    "Warranty expiry cannot be before purchase date.".to_string(),
                ));
            }
        }
        if let (Some(last), Some(next)) = (self.last_maintenance, self.next_maintenance) {
            if next <= last {
                return Err(AppError::Validation(
                    "Next maintenance date must be after last maintenance date.".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Names of the fields whose value differs from `current`
    pub fn changed_fields(&self, current: &Asset) -> Vec<&'static str> {
        let mut changed = Vec::new();

        macro_rules! cmp_field {
            ($field:ident) => {
                if self.$field != current.$field {
                    changed.push(stringify!($field));
                }
            };
        }

        cmp_field!(asset_tag);
        cmp_field!(serial_number);
        cmp_field!(name);
        cmp_field!(asset_type_id);
        cmp_field!(manufacturer_id);
        cmp_field!(model_number);
        cmp_field!(location_id);
        cmp_field!(assigned_to_id);
        cmp_field!(status);
        cmp_field!(priority);
        cmp_field!(purchase_date);
        cmp_field!(installation_date);
        cmp_field!(warranty_expiry);
        cmp_field!(last_maintenance);
        cmp_field!(next_maintenance);
        cmp_field!(description);
        cmp_field!(notes);

        changed
    }
}

/// Assign or unassign an asset
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignAsset {
    /// `null` removes the current assignee
    pub assigned_to_id: Option<i32>,
}

/// Result of an assignment request
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResult {
    pub asset: AssetView,
    /// Absent when the assignee did not change
    pub log: Option<AssetLogEntry>,
}

/// Report an incident against an asset
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportIncident {
    #[validate(length(min = 1, message = "Incident description is required"))]
    pub description: String,
    /// Also set the asset status to faulty
    #[serde(default)]
    pub mark_faulty: bool,
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationLevel {
    Urgent,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub message: String,
    pub action: String,
}

/// Recent issues at or above this count suggest a root cause analysis
pub const RECENT_ISSUE_THRESHOLD: i64 = 3;
/// Window for counting recent issues
pub const RECENT_ISSUE_WINDOW_DAYS: i64 = 90;

/// Maintenance advice from the asset's derived state and recent issue count
pub fn recommendations(asset: &Asset, recent_issues: i64, today: NaiveDate) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if asset.is_maintenance_due(today) {
        out.push(Recommendation {
            level: RecommendationLevel::Urgent,
            message: format!("Maintenance is overdue for {}", asset.asset_tag),
            action: "Schedule immediate maintenance".to_string(),
        });
    }

    match asset.warranty_status(today) {
        WarrantyStatus::Expired => out.push(Recommendation {
            level: RecommendationLevel::Warning,
            message: "Warranty has expired".to_string(),
            action: "Consider extended warranty or replacement planning".to_string(),
        }),
        WarrantyStatus::ExpiringSoon => out.push(Recommendation {
            level: RecommendationLevel::Info,
            message: "Warranty expiring soon".to_string(),
            action: "Review warranty renewal options".to_string(),
        }),
        WarrantyStatus::Active | WarrantyStatus::Unknown => {}
    }

    if recent_issues >= RECENT_ISSUE_THRESHOLD {
        out.push(Recommendation {
            level: RecommendationLevel::Warning,
            message: format!(
                "{} issues reported in the last {} days",
                recent_issues, RECENT_ISSUE_WINDOW_DAYS
            ),
            action: "Consider root cause analysis or replacement".to_string(),
        });
    }

    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn sample_asset() -> Asset {
        let now = Utc::now();
        Asset {
            id: 1,
            asset_tag: "UPS-001".to_string(),
            serial_number: Some("SN123".to_string()),
            name: "Main UPS".to_string(),
            asset_type_id: 1,
            manufacturer_id: 1,
            model_number: "Galaxy VS".to_string(),
            location_id: 1,
            assigned_to_id: None,
            status: AssetStatus::Active,
            priority: AssetPriority::Medium,
            purchase_date: None,
            installation_date: None,
            warranty_expiry: None,
            last_maintenance: None,
            next_maintenance: None,
            description: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_input() -> AssetInput {
        AssetInput {
            asset_tag: "ups-001".to_string(),
            serial_number: Some("SN123".to_string()),
            name: "Main UPS".to_string(),
            asset_type_id: 1,
            manufacturer_id: 1,
            model_number: "Galaxy VS".to_string(),
            location_id: 1,
            assigned_to_id: None,
            status: AssetStatus::Active,
            priority: AssetPriority::Medium,
            purchase_date: None,
            installation_date: None,
            warranty_expiry: None,
            last_maintenance: None,
            next_maintenance: None,
            description: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_warranty_status_boundaries() {
        let today = date(2023, 1, 1);
        assert_eq!(WarrantyStatus::evaluate(None, today), WarrantyStatus::Unknown);
        assert_eq!(
            WarrantyStatus::evaluate(Some(today - Duration::days(1)), today),
            WarrantyStatus::Expired
        );
        assert_eq!(WarrantyStatus::evaluate(Some(today), today), WarrantyStatus::ExpiringSoon);
        assert_eq!(
            WarrantyStatus::evaluate(Some(today + Duration::days(30)), today),
            WarrantyStatus::ExpiringSoon
        );
        assert_eq!(
            WarrantyStatus::evaluate(Some(today + Duration::days(31)), today),
            WarrantyStatus::Active
        );
    }

    #[test]
    fn test_warranty_expiring_soon_thirty_days_after_purchase() {
        let mut asset = sample_asset();
        asset.purchase_date = Some(date(2023, 1, 1));
        asset.warranty_expiry = Some(date(2023, 1, 31));
        assert_eq!(asset.warranty_status(date(2023, 1, 1)), WarrantyStatus::ExpiringSoon);
    }

    #[test]
    fn test_warranty_status_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&WarrantyStatus::ExpiringSoon).unwrap(),
            "\"Expiring Soon\""
        );
        assert_eq!(WarrantyStatus::Expired.to_string(), "Expired");
    }

    #[test]
    fn test_maintenance_due() {
        let today = date(2024, 6, 15);
        let mut asset = sample_asset();
        assert!(!asset.is_maintenance_due(today));

        asset.next_maintenance = Some(today);
        assert!(asset.is_maintenance_due(today));

        asset.next_maintenance = Some(date(2024, 5, 1));
        assert!(asset.is_maintenance_due(today));

        asset.next_maintenance = Some(date(2024, 6, 16));
        assert!(!asset.is_maintenance_due(today));

        let state = asset.derived_state(today);
        assert!(!state.is_maintenance_due);
        assert_eq!(state.warranty_status, WarrantyStatus::Unknown);
    }

    #[test]
    fn test_clean_normalizes_tag_and_serial() {
        let mut input = sample_input();
        input.asset_tag = "  gen-07 ".to_string();
        input.serial_number = Some("   ".to_string());
        let cleaned = input.clean().unwrap();
        assert_eq!(cleaned.asset_tag, "GEN-07");
        assert_eq!(cleaned.serial_number, None);
    }

    #[test]
    fn test_clean_rejects_blank_tag() {
        let mut input = sample_input();
        input.asset_tag = "   ".to_string();
        assert!(matches!(input.clean(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_installation_before_purchase_rejected() {
        let mut input = sample_input();
        input.purchase_date = Some(date(2023, 3, 1));
        input.installation_date = Some(date(2023, 2, 28));
        match input.clean() {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Installation date cannot be before purchase date.")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_warranty_before_purchase_rejected() {
        let mut input = sample_input();
        input.purchase_date = Some(date(2023, 3, 1));
        input.warranty_expiry = Some(date(2023, 1, 1));
        match input.clean() {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Warranty expiry cannot be before purchase date.")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_next_maintenance_must_follow_last() {
        let mut input = sample_input();
        input.last_maintenance = Some(date(2024, 1, 10));
        input.next_maintenance = Some(date(2024, 1, 10));
        assert!(input.clone().clean().is_err());

        input.next_maintenance = Some(date(2024, 1, 11));
        assert!(input.clean().is_ok());
    }

    #[test]
    fn test_same_day_installation_and_unrelated_dates_accepted() {
        let mut input = sample_input();
        input.purchase_date = Some(date(2023, 3, 1));
        input.installation_date = Some(date(2023, 3, 1));
        input.warranty_expiry = Some(date(2023, 3, 1));
        input.next_maintenance = Some(date(2020, 1, 1));
        assert!(input.clean().is_ok());
    }

    #[test]
    fn test_changed_fields() {
        let asset = sample_asset();
        let mut input = sample_input().clean().unwrap();
        assert!(input.changed_fields(&asset).is_empty());

        input.status = AssetStatus::Faulty;
        input.notes = "fan noise".to_string();
        assert_eq!(input.changed_fields(&asset), vec!["status", "notes"]);
    }

    #[test]
    fn test_recommendations() {
        let today = date(2024, 6, 15);
        let mut asset = sample_asset();
        assert!(recommendations(&asset, 0, today).is_empty());

        asset.next_maintenance = Some(date(2024, 6, 1));
        asset.warranty_expiry = Some(date(2024, 7, 1));
        let recs = recommendations(&asset, 3, today);
        let levels: Vec<_> = recs.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                RecommendationLevel::Urgent,
                RecommendationLevel::Info,
                RecommendationLevel::Warning
            ]
        );
        assert_eq!(recs[0].message, "Maintenance is overdue for UPS-001");
        assert_eq!(recs[2].message, "3 issues reported in the last 90 days");

        asset.warranty_expiry = Some(date(2024, 1, 1));
        let recs = recommendations(&asset, 2, today);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].message, "Warranty has expired");
    }

    fn spec(name: &str) -> AssetSpecification {
        AssetSpecification {
            id: 0,
            asset_id: 1,
            specification_name: name.to_string(),
            specification_value: "1".to_string(),
            unit: String::new(),
        }
    }

    fn view(asset: Asset) -> AssetView {
        let listing = AssetListing {
            asset,
            asset_type_name: "UPS".to_string(),
            manufacturer_name: "APC".to_string(),
            location_name: "Kampala".to_string(),
            assigned_to_name: None,
        };
        AssetView::new(listing, date(2024, 6, 15))
    }

    #[test]
    fn test_incident_specifications_keep_listed_names() {
        let kept = incident_specifications(vec![
            spec("Power Rating"),
            spec("Rack Units"),
            spec("voltage"),
            spec("Capacity"),
        ]);
        let names: Vec<_> = kept.iter().map(|s| s.specification_name.as_str()).collect();
        assert_eq!(names, vec!["Power Rating", "Capacity"]);
    }

    #[test]
    fn test_incident_context_flags_critical_priority() {
        let location = Location {
            id: 1,
            name: "Kampala".to_string(),
            country: "Uganda".to_string(),
        };

        let ctx = IncidentContext::new(view(sample_asset()), location.clone(), vec![], vec![], vec![]);
        assert!(!ctx.is_critical);

        let mut asset = sample_asset();
        asset.priority = AssetPriority::Critical;
        let ctx = IncidentContext::new(view(asset), location, vec![], vec![], vec![spec("Temperature")]);
        assert!(ctx.is_critical);
        assert_eq!(ctx.critical_specifications.len(), 1);
    }
}
