//! Fleet health, status counts and dashboard

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::summary::{Dashboard, HealthSummary, StatusSummary},
};

use super::AuthenticatedUser;

/// Health score with critical issues and warranty/maintenance counters
#[utoipa::path(
    get,
    path = "/summary/health",
    tag = "summary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Health summary", body = HealthSummary)
    )
)]
pub async fn health_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<HealthSummary>> {
    let summary = state.services.summary.health(&ctx).await?;
    Ok(Json(summary))
}

/// Asset counts per status
#[utoipa::path(
    get,
    path = "/summary/status",
    tag = "summary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status counts", body = StatusSummary)
    )
)]
pub async fn status_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
) -> AppResult<Json<StatusSummary>> {
    let summary = state.services.summary.status().await?;
    Ok(Json(summary))
}

/// Dashboard: counters, per-type counts, recent maintenance, due assets and latest logs
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "summary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard data", body = Dashboard)
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.summary.dashboard(&ctx).await?;
    Ok(Json(dashboard))
}
