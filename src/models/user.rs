//! User model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    asset::Asset,
    enums::{AssetPriority, AssetStatus},
    reference::Certification,
};

/// Employee account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    /// Staff or national identifier
    pub id_number: String,
    pub full_name: String,
    pub email: Option<String>,
    /// e.g. Facilities, IT, Security
    pub department: String,
    /// e.g. Lead Engineer, Technician
    pub designation: String,
    /// Primary datacenter location
    pub location_id: Option<i32>,
    /// Work shift, e.g. 08:00-20:00
    pub shift: String,
    pub on_duty: bool,
    pub is_active: bool,
    /// Staff accounts manage users and reference data
    pub is_staff: bool,
    pub login_time: Option<DateTime<Utc>>,
    pub logout_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User with resolved location and certifications
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub location_name: Option<String>,
    pub certifications: Vec<Certification>,
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub department: String,
    pub designation: String,
    pub location_name: Option<String>,
    pub on_duty: bool,
    pub is_active: bool,
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Search in username and full name
    pub name: Option<String>,
    pub department: Option<String>,
    /// Location name
    pub location: Option<String>,
    pub on_duty: Option<bool>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "ID number is required"))]
    pub id_number: String,
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    #[serde(default)]
    pub department: String,
    #[validate(length(max = 100, message = "Designation must be at most 100 characters"))]
    #[serde(default)]
    pub designation: String,
    pub location_id: Option<i32>,
    #[validate(length(max = 50, message = "Shift must be at most 50 characters"))]
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub certification_ids: Vec<i32>,
}

/// Update user request (staff)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "ID number is required"))]
    pub id_number: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub location_id: Option<i32>,
    pub shift: Option<String>,
    pub on_duty: Option<bool>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    /// Replaces the whole certification set when present
    pub certification_ids: Option<Vec<i32>>,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub shift: Option<String>,
    pub on_duty: Option<bool>,
    /// Current password (required to change password)
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_staff: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Assigned-asset counters for one user
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct UserAssetSummary {
    pub total_assigned: i64,
    pub active: i64,
    pub maintenance: i64,
    pub faulty: i64,
    /// Maintenance due on or before today, decommissioned assets excluded
    pub maintenance_due: i64,
    pub critical_assets: i64,
}

impl UserAssetSummary {
    pub fn compute<'a>(assets: impl IntoIterator<Item = &'a Asset>, today: NaiveDate) -> Self {
        let mut summary = Self::default();
        for asset in assets {
            summary.total_assigned += 1;
            match asset.status {
                AssetStatus::Active => summary.active += 1,
                AssetStatus::Maintenance => summary.maintenance += 1,
                AssetStatus::Faulty => summary.faulty += 1,
                AssetStatus::Standby | AssetStatus::Decommissioned => {}
            }
            if asset.status != AssetStatus::Decommissioned && asset.is_maintenance_due(today) {
                summary.maintenance_due += 1;
            }
            if asset.priority == AssetPriority::Critical {
                summary.critical_assets += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "jdoe".to_string(),
            user_id: 7,
            is_staff: true,
            exp: now + 3600,
            iat: now,
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert!(parsed.is_staff);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "jdoe".to_string(),
            user_id: 7,
            is_staff: false,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = claims.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_asset_summary() {
        use crate::models::asset::tests::{date, sample_asset};

        let today = date(2024, 4, 1);
        let mut ups = sample_asset();
        ups.priority = AssetPriority::Critical;
        ups.next_maintenance = Some(today);

        let mut pdu = sample_asset();
        pdu.status = AssetStatus::Faulty;

        let mut old = sample_asset();
        old.status = AssetStatus::Decommissioned;
        old.next_maintenance = Some(date(2020, 1, 1));

        let summary = UserAssetSummary::compute([&ups, &pdu, &old], today);
        assert_eq!(summary.total_assigned, 3);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.faulty, 1);
        assert_eq!(summary.maintenance_due, 1);
        assert_eq!(summary.critical_assets, 1);
    }

    #[test]
    fn test_create_user_validation() {
        let payload: CreateUser = serde_json::from_value(serde_json::json!({
            "username": "ab",
            "password": "short",
            "id_number": "ST-001",
            "full_name": "Jane Doe",
            "email": "not-an-email"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("full_name"));
    }
}
