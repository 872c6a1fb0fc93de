//! Maintenance scheduling and lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::maintenance::{
        CancelMaintenance, CompleteMaintenance, MaintenanceQuery, MaintenanceView,
        ScheduleMaintenance,
    },
    repository::Page,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List maintenance records
#[utoipa::path(
    get,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(MaintenanceQuery),
    responses(
        (status = 200, description = "Maintenance records", body = PaginatedResponse<MaintenanceView>)
    )
)]
pub async fn list_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Query(query): Query<MaintenanceQuery>,
) -> AppResult<Json<PaginatedResponse<MaintenanceView>>> {
    let (records, total) = state.services.maintenance.list(&query, &ctx).await?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(PaginatedResponse::new(records, total, page)))
}

/// Schedule maintenance for an asset
#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = ScheduleMaintenance,
    responses(
        (status = 201, description = "Maintenance scheduled", body = MaintenanceView),
        (status = 400, description = "Date in the past or asset cannot be maintained"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn schedule_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<ScheduleMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceView>)> {
    let record = state.services.maintenance.schedule(data, &ctx).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a maintenance record
#[utoipa::path(
    get,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance record ID")),
    responses(
        (status = 200, description = "Maintenance record", body = MaintenanceView),
        (status = 404, description = "Record not found")
    )
)]
pub async fn get_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MaintenanceView>> {
    let record = state.services.maintenance.get(id, &ctx).await?;
    Ok(Json(record))
}

/// Mark scheduled maintenance as in progress
#[utoipa::path(
    post,
    path = "/maintenance/{id}/start",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance record ID")),
    responses(
        (status = 200, description = "Maintenance started", body = MaintenanceView),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Record is not scheduled")
    )
)]
pub async fn start_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MaintenanceView>> {
    let record = state.services.maintenance.start(id, &ctx).await?;
    Ok(Json(record))
}

/// Complete maintenance and update the asset's maintenance dates
#[utoipa::path(
    post,
    path = "/maintenance/{id}/complete",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance record ID")),
    request_body = CompleteMaintenance,
    responses(
        (status = 200, description = "Maintenance completed", body = MaintenanceView),
        (status = 400, description = "Invalid completion data"),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Record is already closed")
    )
)]
pub async fn complete_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CompleteMaintenance>,
) -> AppResult<Json<MaintenanceView>> {
    let record = state.services.maintenance.complete(id, data, &ctx).await?;
    Ok(Json(record))
}

/// Cancel open maintenance
#[utoipa::path(
    post,
    path = "/maintenance/{id}/cancel",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Maintenance record ID")),
    request_body = CancelMaintenance,
    responses(
        (status = 200, description = "Maintenance cancelled", body = MaintenanceView),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Record is already closed")
    )
)]
pub async fn cancel_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CancelMaintenance>,
) -> AppResult<Json<MaintenanceView>> {
    let record = state.services.maintenance.cancel(id, data, &ctx).await?;
    Ok(Json(record))
}
