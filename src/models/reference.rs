//! Reference data: locations, asset types, manufacturers, certifications

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Datacenter site
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: i32,
    /// Unique site name, e.g. Kampala
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationInput {
    #[validate(length(min = 1, max = 100, message = "Location name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Country must be 1 to 100 characters"))]
    pub country: String,
}

// ---------------------------------------------------------------------------
// AssetType
// ---------------------------------------------------------------------------

/// Asset category, e.g. UPS, Generator
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssetType {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssetTypeInput {
    #[validate(length(min = 1, max = 100, message = "Asset type name must be 1 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Asset type with the number of assets using it
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetTypeCount {
    pub id: i32,
    pub name: String,
    pub asset_count: i64,
}

// ---------------------------------------------------------------------------
// Manufacturer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Manufacturer {
    pub id: i32,
    pub name: String,
    pub website: Option<String>,
    /// Support e-mail or phone
    pub support_contact: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManufacturerInput {
    #[validate(length(min = 1, max = 100, message = "Manufacturer name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 255, message = "Support contact must be at most 255 characters"))]
    #[serde(default)]
    pub support_contact: String,
}

// ---------------------------------------------------------------------------
// Certification
// ---------------------------------------------------------------------------

/// Datacenter certification an employee may hold
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Certification {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CertificationInput {
    #[validate(length(min = 1, max = 100, message = "Certification name must be 1 to 100 characters"))]
    pub name: String,
}
