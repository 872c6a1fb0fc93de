//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        asset::AssetView,
        user::{CreateUser, UpdateUser, User, UserAssetSummary, UserDetails, UserQuery, UserShort},
    },
    repository::Page,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List users with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<UserShort>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<UserShort>>> {
    ctx.require_staff()?;

    let (users, total) = state.services.users.search_users(&query).await?;
    let page = Page::new(query.page, query.per_page);
    Ok(Json(PaginatedResponse::new(users, total, page)))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserDetails),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserDetails>> {
    ctx.require_self_or_staff(id)?;

    let user = state.services.users.get_details(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserDetails),
        (status = 400, description = "Invalid input or duplicate username"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserDetails>)> {
    ctx.require_staff()?;

    let created = state.services.users.create_user(data, &ctx).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDetails),
        (status = 404, description = "User not found"),
        (status = 422, description = "Cannot deactivate or demote yourself")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateUser>,
) -> AppResult<Json<UserDetails>> {
    ctx.require_staff()?;

    let updated = state.services.users.update_user(id, data, &ctx).await?;
    Ok(Json(updated))
}

/// Deactivate a user (accounts are never deleted)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    ctx.require_staff()?;

    let user = state.services.users.deactivate_user(id, &ctx).await?;
    Ok(Json(user))
}

/// Assets assigned to a user
#[utoipa::path(
    get,
    path = "/users/{id}/assets",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Assigned assets", body = Vec<AssetView>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<AssetView>>> {
    ctx.require_self_or_staff(id)?;

    let assets = state.services.users.user_assets(id, &ctx).await?;
    Ok(Json(assets))
}

/// Counters over a user's assigned assets
#[utoipa::path(
    get,
    path = "/users/{id}/asset-summary",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Assigned asset summary", body = UserAssetSummary),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_asset_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserAssetSummary>> {
    ctx.require_self_or_staff(id)?;

    let summary = state.services.users.user_asset_summary(id, &ctx).await?;
    Ok(Json(summary))
}
