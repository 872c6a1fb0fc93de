//! DCIM Server - datacenter asset inventory and maintenance tracking
//!
//! REST API server for assets, assignments, maintenance and audit logs.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dcim_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("dcim_server={},tower_http=debug", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.uses_json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting DCIM Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    if services
        .users
        .ensure_bootstrap_admin()
        .await
        .context("Failed to create bootstrap administrator")?
    {
        tracing::warn!(
            username = %config.auth.bootstrap_admin_username,
            "Created bootstrap administrator; change its password"
        );
    }

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(
        server_host.parse().context("Invalid host address")?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route(
            "/users/:id",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::deactivate_user),
        )
        .route("/users/:id/assets", get(api::users::user_assets))
        .route("/users/:id/asset-summary", get(api::users::user_asset_summary))
        // Reference data
        .route(
            "/locations",
            get(api::reference::list_locations).post(api::reference::create_location),
        )
        .route(
            "/locations/:id",
            get(api::reference::get_location)
                .put(api::reference::update_location)
                .delete(api::reference::delete_location),
        )
        .route(
            "/asset-types",
            get(api::reference::list_asset_types).post(api::reference::create_asset_type),
        )
        .route(
            "/asset-types/:id",
            get(api::reference::get_asset_type)
                .put(api::reference::update_asset_type)
                .delete(api::reference::delete_asset_type),
        )
        // Same segment name as above; the handler reads it as the type name
        .route("/asset-types/:id/assets", get(api::reference::assets_of_type))
        .route(
            "/manufacturers",
            get(api::reference::list_manufacturers).post(api::reference::create_manufacturer),
        )
        .route(
            "/manufacturers/:id",
            get(api::reference::get_manufacturer)
                .put(api::reference::update_manufacturer)
                .delete(api::reference::delete_manufacturer),
        )
        .route(
            "/certifications",
            get(api::reference::list_certifications).post(api::reference::create_certification),
        )
        .route(
            "/certifications/:id",
            get(api::reference::get_certification)
                .put(api::reference::update_certification)
                .delete(api::reference::delete_certification),
        )
        // Assets
        .route("/assets", get(api::assets::list_assets).post(api::assets::create_asset))
        .route(
            "/assets/:tag",
            get(api::assets::get_asset)
                .put(api::assets::update_asset)
                .delete(api::assets::delete_asset),
        )
        .route("/assets/:tag/assign", put(api::assets::assign_asset))
        .route("/assets/:tag/incidents", post(api::assets::report_incident))
        .route("/assets/:tag/logs", get(api::assets::asset_logs))
        .route("/assets/:tag/maintenance", get(api::assets::asset_maintenance))
        .route("/assets/:tag/recommendations", get(api::assets::asset_recommendations))
        .route("/assets/:tag/incident-context", get(api::assets::incident_context))
        .route("/assets/:tag/related", get(api::assets::related_assets))
        .route(
            "/assets/:tag/specifications",
            get(api::assets::list_specifications).put(api::assets::upsert_specification),
        )
        .route(
            "/assets/:tag/specifications/:name",
            delete(api::assets::delete_specification),
        )
        // Maintenance
        .route(
            "/maintenance",
            get(api::maintenance::list_maintenance).post(api::maintenance::schedule_maintenance),
        )
        .route("/maintenance/:id", get(api::maintenance::get_maintenance))
        .route("/maintenance/:id/start", post(api::maintenance::start_maintenance))
        .route("/maintenance/:id/complete", post(api::maintenance::complete_maintenance))
        .route("/maintenance/:id/cancel", post(api::maintenance::cancel_maintenance))
        // Logs
        .route("/logs", get(api::logs::list_logs))
        // Summaries
        .route("/summary/health", get(api::summary::health_summary))
        .route("/summary/status", get(api::summary::status_summary))
        .route("/dashboard", get(api::summary::dashboard))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
