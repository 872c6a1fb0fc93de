//! Reference data endpoints: locations, asset types, manufacturers and certifications

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        asset::AssetView,
        reference::{
            AssetType, AssetTypeInput, Certification, CertificationInput, Location, LocationInput,
            Manufacturer, ManufacturerInput,
        },
    },
};

use super::AuthenticatedUser;

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// List locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "reference",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Locations by name", body = Vec<Location>)
    )
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<Location>>> {
    let locations = state.services.reference.list_locations().await?;
    Ok(Json(locations))
}

/// Get a location
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Location>> {
    let location = state.services.reference.get_location(id).await?;
    Ok(Json(location))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "reference",
    security(("bearer_auth" = [])),
    request_body = LocationInput,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<LocationInput>,
) -> AppResult<(StatusCode, Json<Location>)> {
    ctx.require_staff()?;

    let location = state.services.reference.create_location(data, &ctx).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = LocationInput,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<LocationInput>,
) -> AppResult<Json<Location>> {
    ctx.require_staff()?;

    let location = state.services.reference.update_location(id, data, &ctx).await?;
    Ok(Json(location))
}

/// Delete a location that no asset or user references
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Location still referenced")
    )
)]
pub async fn delete_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.reference.delete_location(id, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Asset types
// ---------------------------------------------------------------------------

/// List asset types
#[utoipa::path(
    get,
    path = "/asset-types",
    tag = "reference",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Asset types by name", body = Vec<AssetType>)
    )
)]
pub async fn list_asset_types(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<AssetType>>> {
    let types = state.services.reference.list_asset_types().await?;
    Ok(Json(types))
}

/// Get an asset type
#[utoipa::path(
    get,
    path = "/asset-types/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset type ID")),
    responses(
        (status = 200, description = "Asset type", body = AssetType),
        (status = 404, description = "Asset type not found")
    )
)]
pub async fn get_asset_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AssetType>> {
    let asset_type = state.services.reference.get_asset_type(id).await?;
    Ok(Json(asset_type))
}

/// Assets of a type, looked up by type name
#[utoipa::path(
    get,
    path = "/asset-types/{name}/assets",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Asset type name")),
    responses(
        (status = 200, description = "Assets of the type", body = Vec<AssetView>),
        (status = 404, description = "Asset type not found")
    )
)]
pub async fn assets_of_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<AssetView>>> {
    let assets = state.services.reference.assets_of_type(&name, &ctx).await?;
    Ok(Json(assets))
}

/// Create an asset type
#[utoipa::path(
    post,
    path = "/asset-types",
    tag = "reference",
    security(("bearer_auth" = [])),
    request_body = AssetTypeInput,
    responses(
        (status = 201, description = "Asset type created", body = AssetType),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_asset_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<AssetTypeInput>,
) -> AppResult<(StatusCode, Json<AssetType>)> {
    ctx.require_staff()?;

    let asset_type = state.services.reference.create_asset_type(data, &ctx).await?;
    Ok((StatusCode::CREATED, Json(asset_type)))
}

/// Update an asset type
#[utoipa::path(
    put,
    path = "/asset-types/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset type ID")),
    request_body = AssetTypeInput,
    responses(
        (status = 200, description = "Asset type updated", body = AssetType),
        (status = 404, description = "Asset type not found")
    )
)]
pub async fn update_asset_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AssetTypeInput>,
) -> AppResult<Json<AssetType>> {
    ctx.require_staff()?;

    let asset_type = state
        .services
        .reference
        .update_asset_type(id, data, &ctx)
        .await?;
    Ok(Json(asset_type))
}

/// Delete an asset type that no asset references
#[utoipa::path(
    delete,
    path = "/asset-types/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset type ID")),
    responses(
        (status = 204, description = "Asset type deleted"),
        (status = 404, description = "Asset type not found"),
        (status = 409, description = "Asset type still referenced")
    )
)]
pub async fn delete_asset_type(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.reference.delete_asset_type(id, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Manufacturers
// ---------------------------------------------------------------------------

/// List manufacturers
#[utoipa::path(
    get,
    path = "/manufacturers",
    tag = "reference",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Manufacturers by name", body = Vec<Manufacturer>)
    )
)]
pub async fn list_manufacturers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<Manufacturer>>> {
    let manufacturers = state.services.reference.list_manufacturers().await?;
    Ok(Json(manufacturers))
}

/// Get a manufacturer
#[utoipa::path(
    get,
    path = "/manufacturers/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Manufacturer ID")),
    responses(
        (status = 200, description = "Manufacturer", body = Manufacturer),
        (status = 404, description = "Manufacturer not found")
    )
)]
pub async fn get_manufacturer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Manufacturer>> {
    let manufacturer = state.services.reference.get_manufacturer(id).await?;
    Ok(Json(manufacturer))
}

/// Create a manufacturer
#[utoipa::path(
    post,
    path = "/manufacturers",
    tag = "reference",
    security(("bearer_auth" = [])),
    request_body = ManufacturerInput,
    responses(
        (status = 201, description = "Manufacturer created", body = Manufacturer),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_manufacturer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<ManufacturerInput>,
) -> AppResult<(StatusCode, Json<Manufacturer>)> {
    ctx.require_staff()?;

    let manufacturer = state
        .services
        .reference
        .create_manufacturer(data, &ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

/// Update a manufacturer
#[utoipa::path(
    put,
    path = "/manufacturers/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Manufacturer ID")),
    request_body = ManufacturerInput,
    responses(
        (status = 200, description = "Manufacturer updated", body = Manufacturer),
        (status = 404, description = "Manufacturer not found")
    )
)]
pub async fn update_manufacturer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ManufacturerInput>,
) -> AppResult<Json<Manufacturer>> {
    ctx.require_staff()?;

    let manufacturer = state
        .services
        .reference
        .update_manufacturer(id, data, &ctx)
        .await?;
    Ok(Json(manufacturer))
}

/// Delete a manufacturer that no asset references
#[utoipa::path(
    delete,
    path = "/manufacturers/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Manufacturer ID")),
    responses(
        (status = 204, description = "Manufacturer deleted"),
        (status = 404, description = "Manufacturer not found"),
        (status = 409, description = "Manufacturer still referenced")
    )
)]
pub async fn delete_manufacturer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.reference.delete_manufacturer(id, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Certifications
// ---------------------------------------------------------------------------

/// List certifications
#[utoipa::path(
    get,
    path = "/certifications",
    tag = "reference",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Certifications by name", body = Vec<Certification>)
    )
)]
pub async fn list_certifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<Certification>>> {
    let certifications = state.services.reference.list_certifications().await?;
    Ok(Json(certifications))
}

/// Get a certification
#[utoipa::path(
    get,
    path = "/certifications/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Certification ID")),
    responses(
        (status = 200, description = "Certification", body = Certification),
        (status = 404, description = "Certification not found")
    )
)]
pub async fn get_certification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Certification>> {
    let certification = state.services.reference.get_certification(id).await?;
    Ok(Json(certification))
}

/// Create a certification
#[utoipa::path(
    post,
    path = "/certifications",
    tag = "reference",
    security(("bearer_auth" = [])),
    request_body = CertificationInput,
    responses(
        (status = 201, description = "Certification created", body = Certification),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_certification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(data): Json<CertificationInput>,
) -> AppResult<(StatusCode, Json<Certification>)> {
    ctx.require_staff()?;

    let certification = state
        .services
        .reference
        .create_certification(data, &ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(certification)))
}

/// Update a certification
#[utoipa::path(
    put,
    path = "/certifications/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Certification ID")),
    request_body = CertificationInput,
    responses(
        (status = 200, description = "Certification updated", body = Certification),
        (status = 404, description = "Certification not found")
    )
)]
pub async fn update_certification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CertificationInput>,
) -> AppResult<Json<Certification>> {
    ctx.require_staff()?;

    let certification = state
        .services
        .reference
        .update_certification(id, data, &ctx)
        .await?;
    Ok(Json(certification))
}

/// Delete a certification; holders lose it
#[utoipa::path(
    delete,
    path = "/certifications/{id}",
    tag = "reference",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Certification ID")),
    responses(
        (status = 204, description = "Certification deleted"),
        (status = 404, description = "Certification not found")
    )
)]
pub async fn delete_certification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.reference.delete_certification(id, &ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}
