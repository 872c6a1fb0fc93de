//! Free-form technical specifications attached to an asset

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// One (name, value, unit) attribute, unique per asset and name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssetSpecification {
    pub id: i32,
    pub asset_id: i32,
    /// e.g. Power Rating
    pub specification_name: String,
    /// e.g. 600
    pub specification_value: String,
    /// e.g. kVA
    pub unit: String,
}

impl AssetSpecification {
    /// Value with its unit, as recorded in the audit log
    pub fn display_value(&self) -> String {
        format_value(&self.specification_value, &self.unit)
    }
}

pub fn format_value(value: &str, unit: &str) -> String {
    if unit.is_empty() {
        value.to_string()
    } else {
        format!("{} {}", value, unit)
    }
}

/// Insert or replace a specification by name
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertSpecification {
    #[validate(length(min = 1, max = 100, message = "Specification name must be 1 to 100 characters"))]
    pub specification_name: String,
    #[validate(length(min = 1, max = 255, message = "Specification value must be 1 to 255 characters"))]
    pub specification_value: String,
    #[validate(length(max = 50, message = "Unit must be at most 50 characters"))]
    #[serde(default)]
    pub unit: String,
}

impl UpsertSpecification {
    pub fn display_value(&self) -> String {
        format_value(&self.specification_value, &self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value() {
        assert_eq!(format_value("600", "kVA"), "600 kVA");
        assert_eq!(format_value("Lithium-ion", ""), "Lithium-ion");
    }

    #[test]
    fn test_upsert_validation() {
        let spec = UpsertSpecification {
            specification_name: String::new(),
            specification_value: "1000".to_string(),
            unit: "Liters".to_string(),
        };
        assert!(spec.validate().is_err());
    }
}
