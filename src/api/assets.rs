//! Asset endpoints, addressed by asset tag

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        asset::{
            AssetDetails, AssetInput, AssetQuery, AssetView, AssignAsset, AssignmentResult,
            IncidentContext, Recommendation, ReportIncident,
        },
        asset_log::AssetLogEntry,
        maintenance::MaintenanceView,
        specification::{AssetSpecification, UpsertSpecification},
    },
    repository::Page,
};

use super::{AuthenticatedUser, PageQuery, PaginatedResponse};

/// List assets with filters
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Assets ordered by tag", body = PaginatedResponse<AssetView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PaginatedResponse<AssetView>>> {
    let (assets, total) = state.services.assets.list(&query, &ctx).await?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(PaginatedResponse::new(assets, total, page)))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = AssetInput,
    responses(
        (status = 201, description = "Asset created", body = AssetView),
        (status = 400, description = "Invalid input, duplicate tag or serial number")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(input): Json<AssetInput>,
) -> AppResult<(StatusCode, Json<AssetView>)> {
    let asset = state.services.assets.create(input, &ctx).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Asset details with specifications, recent maintenance and logs
#[utoipa::path(
    get,
    path = "/assets/{tag}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Asset details", body = AssetDetails),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<AssetDetails>> {
    let details = state.services.assets.details(&tag, &ctx).await?;
    Ok(Json(details))
}

/// Edit an asset; one log entry describes the change
#[utoipa::path(
    put,
    path = "/assets/{tag}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    request_body = AssetInput,
    responses(
        (status = 200, description = "Asset updated", body = AssetView),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
    Json(input): Json<AssetInput>,
) -> AppResult<Json<AssetView>> {
    let asset = state.services.assets.update(&tag, input, &ctx).await?;
    Ok(Json(asset))
}

/// Delete an asset with its history
#[utoipa::path(
    delete,
    path = "/assets/{tag}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.assets.delete(&tag, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign an asset to a user, or unassign it
#[utoipa::path(
    put,
    path = "/assets/{tag}/assign",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    request_body = AssignAsset,
    responses(
        (status = 200, description = "Assignment applied", body = AssignmentResult),
        (status = 400, description = "Assignee is inactive"),
        (status = 404, description = "Asset or user not found")
    )
)]
pub async fn assign_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
    Json(request): Json<AssignAsset>,
) -> AppResult<Json<AssignmentResult>> {
    let result = state
        .services
        .assets
        .assign(&tag, request.assigned_to_id, &ctx)
        .await?;
    Ok(Json(result))
}

/// Report an incident
#[utoipa::path(
    post,
    path = "/assets/{tag}/incidents",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    request_body = ReportIncident,
    responses(
        (status = 201, description = "Incident logged", body = AssetLogEntry),
        (status = 400, description = "Missing description"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn report_incident(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
    Json(report): Json<ReportIncident>,
) -> AppResult<(StatusCode, Json<AssetLogEntry>)> {
    let entry = state
        .services
        .assets
        .report_incident(&tag, report, &ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Log history of an asset, newest first
#[utoipa::path(
    get,
    path = "/assets/{tag}/logs",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("tag" = String, Path, description = "Asset tag"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Log entries", body = PaginatedResponse<AssetLogEntry>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<AssetLogEntry>>> {
    let page = query.page();
    let (entries, total) = state.services.logs.asset_logs(&tag, page).await?;
    Ok(Json(PaginatedResponse::new(entries, total, page)))
}

/// Maintenance records of an asset
#[utoipa::path(
    get,
    path = "/assets/{tag}/maintenance",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Maintenance records", body = Vec<MaintenanceView>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<Vec<MaintenanceView>>> {
    let records = state
        .services
        .maintenance
        .asset_maintenance(&tag, &ctx)
        .await?;
    Ok(Json(records))
}

/// Maintenance recommendations
#[utoipa::path(
    get,
    path = "/assets/{tag}/recommendations",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Recommendations, most urgent first", body = Vec<Recommendation>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn asset_recommendations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state.services.assets.recommendations(&tag, &ctx).await?;
    Ok(Json(recommendations))
}

/// Context for handling an incident on an asset
#[utoipa::path(
    get,
    path = "/assets/{tag}/incident-context",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Recent history, location and key specifications", body = IncidentContext),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn incident_context(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<IncidentContext>> {
    let context = state.services.assets.incident_context(&tag, &ctx).await?;
    Ok(Json(context))
}

/// Assets sharing location and type, or assignee, with this one
#[utoipa::path(
    get,
    path = "/assets/{tag}/related",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Related assets ordered by tag", body = Vec<AssetView>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn related_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<Vec<AssetView>>> {
    let assets = state.services.assets.related(&tag, &ctx).await?;
    Ok(Json(assets))
}

/// Technical specifications of an asset
#[utoipa::path(
    get,
    path = "/assets/{tag}/specifications",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    responses(
        (status = 200, description = "Specifications by name", body = Vec<AssetSpecification>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn list_specifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(tag): Path<String>,
) -> AppResult<Json<Vec<AssetSpecification>>> {
    let specifications = state.services.specifications.list(&tag).await?;
    Ok(Json(specifications))
}

/// Add or replace a specification by name
#[utoipa::path(
    put,
    path = "/assets/{tag}/specifications",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("tag" = String, Path, description = "Asset tag")),
    request_body = UpsertSpecification,
    responses(
        (status = 200, description = "Specification stored", body = AssetSpecification),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn upsert_specification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(tag): Path<String>,
    Json(data): Json<UpsertSpecification>,
) -> AppResult<Json<AssetSpecification>> {
    let specification = state
        .services
        .specifications
        .upsert(&tag, data, &ctx)
        .await?;
    Ok(Json(specification))
}

/// Remove a specification
#[utoipa::path(
    delete,
    path = "/assets/{tag}/specifications/{name}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("tag" = String, Path, description = "Asset tag"),
        ("name" = String, Path, description = "Specification name")
    ),
    responses(
        (status = 204, description = "Specification removed"),
        (status = 404, description = "Asset or specification not found")
    )
)]
pub async fn delete_specification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path((tag, name)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .services
        .specifications
        .delete(&tag, &name, &ctx)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
