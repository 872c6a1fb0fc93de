//! Shared domain enums, stored as TEXT slugs

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a slug-backed enum: serde and the database both use the slug,
/// `Display` renders the human label.
macro_rules! slug_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => ($slug:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $slug ),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $( $slug => Ok($name::$variant), )+
                    _ => Err(format!("Invalid {} value: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

slug_enum! {
    /// Operational status of an asset
    pub enum AssetStatus {
        Active => ("active", "Active"),
        Maintenance => ("maintenance", "Under Maintenance"),
        Decommissioned => ("decommissioned", "Decommissioned"),
        Standby => ("standby", "Standby"),
        Faulty => ("faulty", "Faulty"),
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Active
    }
}

impl AssetStatus {
    /// Statuses for which new maintenance may be scheduled
    pub fn accepts_maintenance(&self) -> bool {
        matches!(
            self,
            AssetStatus::Active | AssetStatus::Maintenance | AssetStatus::Standby
        )
    }
}

// ---------------------------------------------------------------------------
// AssetPriority
// ---------------------------------------------------------------------------

slug_enum! {
    /// Business priority of an asset
    pub enum AssetPriority {
        Critical => ("critical", "Critical"),
        High => ("high", "High"),
        Medium => ("medium", "Medium"),
        Low => ("low", "Low"),
    }
}

impl Default for AssetPriority {
    fn default() -> Self {
        AssetPriority::Medium
    }
}

// ---------------------------------------------------------------------------
// LogEventType
// ---------------------------------------------------------------------------

slug_enum! {
    /// Kind of event recorded in the asset audit log
    pub enum LogEventType {
        Created => ("created", "Asset Created"),
        Updated => ("updated", "Asset Updated"),
        StatusChange => ("status_change", "Status Changed"),
        AssignmentChange => ("assignment_change", "Assignment Changed"),
        MaintenanceScheduled => ("maintenance_scheduled", "Maintenance Scheduled"),
        MaintenanceCompleted => ("maintenance_completed", "Maintenance Completed"),
        IncidentReported => ("incident_reported", "Incident Reported"),
        SpecificationUpdated => ("specification_updated", "Specification Updated"),
    }
}

// ---------------------------------------------------------------------------
// MaintenanceType
// ---------------------------------------------------------------------------

slug_enum! {
    pub enum MaintenanceType {
        Preventive => ("preventive", "Preventive Maintenance"),
        Corrective => ("corrective", "Corrective Maintenance"),
        Emergency => ("emergency", "Emergency Maintenance"),
        Inspection => ("inspection", "Inspection"),
        Calibration => ("calibration", "Calibration"),
    }
}

// ---------------------------------------------------------------------------
// MaintenanceStatus
// ---------------------------------------------------------------------------

slug_enum! {
    pub enum MaintenanceStatus {
        Scheduled => ("scheduled", "Scheduled"),
        InProgress => ("in_progress", "In Progress"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl Default for MaintenanceStatus {
    fn default() -> Self {
        MaintenanceStatus::Scheduled
    }
}

impl MaintenanceStatus {
    /// Completed and cancelled records never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, MaintenanceStatus::Completed | MaintenanceStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_round_trip_through_from_str() {
        for status in AssetStatus::ALL {
            assert_eq!(status.as_str().parse::<AssetStatus>(), Ok(*status));
        }
        for event in LogEventType::ALL {
            assert_eq!(event.as_str().parse::<LogEventType>(), Ok(*event));
        }
        assert_eq!("IN_PROGRESS".parse::<MaintenanceStatus>(), Ok(MaintenanceStatus::InProgress));
        assert!("broken".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_slugs() {
        assert_eq!(
            serde_json::to_string(&LogEventType::AssignmentChange).unwrap(),
            "\"assignment_change\""
        );
        let t: MaintenanceType = serde_json::from_str("\"calibration\"").unwrap();
        assert_eq!(t, MaintenanceType::Calibration);
    }

    #[test]
    fn test_display_uses_labels() {
        assert_eq!(MaintenanceType::Preventive.to_string(), "Preventive Maintenance");
        assert_eq!(AssetStatus::Maintenance.to_string(), "Under Maintenance");
    }

    #[test]
    fn test_defaults_and_rules() {
        assert_eq!(AssetStatus::default(), AssetStatus::Active);
        assert_eq!(AssetPriority::default(), AssetPriority::Medium);
        assert!(AssetStatus::Standby.accepts_maintenance());
        assert!(!AssetStatus::Faulty.accepts_maintenance());
        assert!(!AssetStatus::Decommissioned.accepts_maintenance());
        assert!(MaintenanceStatus::Cancelled.is_terminal());
        assert!(!MaintenanceStatus::InProgress.is_terminal());
    }
}
