//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, auth, health, logs, maintenance, reference, summary, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DCIM API",
        version = "1.0.0",
        description = "Datacenter asset inventory and maintenance tracking REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::deactivate_user,
        users::user_assets,
        users::user_asset_summary,
        // Reference data
        reference::list_locations,
        reference::get_location,
        reference::create_location,
        reference::update_location,
        reference::delete_location,
        reference::list_asset_types,
        reference::get_asset_type,
        reference::assets_of_type,
        reference::create_asset_type,
        reference::update_asset_type,
        reference::delete_asset_type,
        reference::list_manufacturers,
        reference::get_manufacturer,
        reference::create_manufacturer,
        reference::update_manufacturer,
        reference::delete_manufacturer,
        reference::list_certifications,
        reference::get_certification,
        reference::create_certification,
        reference::update_certification,
        reference::delete_certification,
        // Assets
        assets::list_assets,
        assets::create_asset,
        assets::get_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::assign_asset,
        assets::report_incident,
        assets::asset_logs,
        assets::asset_maintenance,
        assets::asset_recommendations,
        assets::incident_context,
        assets::related_assets,
        assets::list_specifications,
        assets::upsert_specification,
        assets::delete_specification,
        // Maintenance
        maintenance::list_maintenance,
        maintenance::schedule_maintenance,
        maintenance::get_maintenance,
        maintenance::start_maintenance,
        maintenance::complete_maintenance,
        maintenance::cancel_maintenance,
        // Logs
        logs::list_logs,
        // Summaries
        summary::health_summary,
        summary::status_summary,
        summary::dashboard,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Enums
            crate::models::enums::AssetStatus,
            crate::models::enums::AssetPriority,
            crate::models::enums::LogEventType,
            crate::models::enums::MaintenanceType,
            crate::models::enums::MaintenanceStatus,
            // Users
            crate::models::user::User,
            crate::models::user::UserDetails,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::UserAssetSummary,
            // Reference data
            crate::models::reference::Location,
            crate::models::reference::LocationInput,
            crate::models::reference::AssetType,
            crate::models::reference::AssetTypeInput,
            crate::models::reference::AssetTypeCount,
            crate::models::reference::Manufacturer,
            crate::models::reference::ManufacturerInput,
            crate::models::reference::Certification,
            crate::models::reference::CertificationInput,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetListing,
            crate::models::asset::AssetView,
            crate::models::asset::AssetDetails,
            crate::models::asset::IncidentContext,
            crate::models::asset::AssetDerivedState,
            crate::models::asset::WarrantyStatus,
            crate::models::asset::AssetInput,
            crate::models::asset::AssignAsset,
            crate::models::asset::AssignmentResult,
            crate::models::asset::ReportIncident,
            crate::models::asset::Recommendation,
            crate::models::asset::RecommendationLevel,
            crate::models::specification::AssetSpecification,
            crate::models::specification::UpsertSpecification,
            // Logs
            crate::models::asset_log::AssetLog,
            crate::models::asset_log::AssetLogEntry,
            // Maintenance
            crate::models::maintenance::MaintenanceRecord,
            crate::models::maintenance::MaintenanceListing,
            crate::models::maintenance::MaintenanceView,
            crate::models::maintenance::ScheduleMaintenance,
            crate::models::maintenance::CompleteMaintenance,
            crate::models::maintenance::CancelMaintenance,
            // Summaries
            crate::models::summary::StatusSummary,
            crate::models::summary::CriticalIssue,
            crate::models::summary::HealthSummary,
            crate::models::summary::Dashboard,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "reference", description = "Locations, asset types, manufacturers and certifications"),
        (name = "assets", description = "Asset inventory"),
        (name = "maintenance", description = "Maintenance scheduling"),
        (name = "logs", description = "Asset audit log"),
        (name = "summary", description = "Health summaries and dashboard")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/assets/{tag}/assign"));
        assert!(doc.paths.paths.contains_key("/maintenance/{id}/complete"));
        assert!(doc.paths.paths.contains_key("/assets/{tag}/incident-context"));
        assert!(doc.paths.paths.contains_key("/assets/{tag}/related"));
    }
}
