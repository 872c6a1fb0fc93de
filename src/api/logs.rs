//! Global asset log listing

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::asset_log::{AssetLogEntry, AssetLogQuery},
    repository::Page,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Recent log entries across all assets, newest first
#[utoipa::path(
    get,
    path = "/logs",
    tag = "logs",
    security(("bearer_auth" = [])),
    params(AssetLogQuery),
    responses(
        (status = 200, description = "Log entries", body = PaginatedResponse<AssetLogEntry>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Query(query): Query<AssetLogQuery>,
) -> AppResult<Json<PaginatedResponse<AssetLogEntry>>> {
    let (entries, total) = state.services.logs.recent_logs(&query).await?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(PaginatedResponse::new(entries, total, page)))
}
