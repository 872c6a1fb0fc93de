//! Reference data service: locations, asset types, manufacturers, certifications

use validator::Validate;

use crate::{
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        asset::AssetView,
        reference::{
            AssetType, AssetTypeInput, Certification, CertificationInput, Location, LocationInput,
            Manufacturer, ManufacturerInput,
        },
    },
    repository::{reference::ReferenceCount, Repository},
};

#[derive(Clone)]
pub struct ReferenceService {
    repository: Repository,
}

fn duplicate_name(kind: &str) -> AppError {
    AppError::Validation(format!("{} with this name already exists.", kind))
}

/// `Conflict` describing the rows that still point at the record
fn still_referenced(label: &str, name: &str, refs: ReferenceCount) -> AppError {
    let mut parts = Vec::new();
    if refs.assets > 0 {
        parts.push(format!("{} asset(s)", refs.assets));
    }
    if refs.users > 0 {
        parts.push(format!("{} user(s)", refs.users));
    }
    AppError::Conflict(format!(
        "{} '{}' is still referenced by {}",
        label,
        name,
        parts.join(" and ")
    ))
}

/// A reference added between the count and the delete trips the foreign key
fn referenced_since_check(err: AppError, label: &str, name: &str) -> AppError {
    match err {
        AppError::Database(e) => AppError::on_foreign_key_violation(
            e,
            &format!("{} '{}' is still referenced", label, name),
        ),
        other => other,
    }
}

impl ReferenceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Locations

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.repository.reference.list_locations().await
    }

    pub async fn get_location(&self, id: i32) -> AppResult<Location> {
        self.repository.reference.get_location(id).await
    }

    pub async fn create_location(&self, data: LocationInput, ctx: &RequestContext) -> AppResult<Location> {
        data.validate()?;
        if self.repository.reference.location_name_taken(data.name.trim(), None).await? {
            return Err(duplicate_name("A location"));
        }
        let location = self
            .repository
            .reference
            .create_location(&data)
            .await
            .map_err(|e| on_duplicate(e, "A location"))?;
        tracing::info!(location_id = location.id, actor = ctx.user_id, "Location created");
        Ok(location)
    }

    pub async fn update_location(&self, id: i32, data: LocationInput, ctx: &RequestContext) -> AppResult<Location> {
        data.validate()?;
        if self.repository.reference.location_name_taken(data.name.trim(), Some(id)).await? {
            return Err(duplicate_name("A location"));
        }
        let location = self
            .repository
            .reference
            .update_location(id, &data)
            .await
            .map_err(|e| on_duplicate(e, "A location"))?;
        tracing::info!(location_id = id, actor = ctx.user_id, "Location updated");
        Ok(location)
    }

    pub async fn delete_location(&self, id: i32, ctx: &RequestContext) -> AppResult<()> {
        let location = self.repository.reference.get_location(id).await?;
        let refs = self.repository.reference.location_references(id).await?;
        if !refs.is_empty() {
            tracing::warn!(location_id = id, assets = refs.assets, users = refs.users, "Refused to delete referenced location");
            return Err(still_referenced("Location", &location.name, refs));
        }
        self.repository
            .reference
            .delete_location(id)
            .await
            .map_err(|e| referenced_since_check(e, "Location", &location.name))?;
        tracing::info!(location_id = id, actor = ctx.user_id, "Location deleted");
        Ok(())
    }

    // Asset types

    pub async fn list_asset_types(&self) -> AppResult<Vec<AssetType>> {
        self.repository.reference.list_asset_types().await
    }

    pub async fn get_asset_type(&self, id: i32) -> AppResult<AssetType> {
        self.repository.reference.get_asset_type(id).await
    }

    /// Assets of the named type; an unknown type is `NotFound`
    pub async fn assets_of_type(&self, name: &str, ctx: &RequestContext) -> AppResult<Vec<AssetView>> {
        let asset_type = self
            .repository
            .reference
            .find_asset_type_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset type {} not found", name)))?;
        let listings = self.repository.assets.list_by_type(asset_type.id).await?;
        Ok(listings
            .into_iter()
            .map(|listing| AssetView::new(listing, ctx.today))
            .collect())
    }

    pub async fn create_asset_type(&self, data: AssetTypeInput, ctx: &RequestContext) -> AppResult<AssetType> {
        data.validate()?;
        if self.repository.reference.asset_type_name_taken(data.name.trim(), None).await? {
            return Err(duplicate_name("An asset type"));
        }
        let asset_type = self
            .repository
            .reference
            .create_asset_type(&data)
            .await
            .map_err(|e| on_duplicate(e, "An asset type"))?;
        tracing::info!(asset_type_id = asset_type.id, actor = ctx.user_id, "Asset type created");
        Ok(asset_type)
    }

    pub async fn update_asset_type(&self, id: i32, data: AssetTypeInput, ctx: &RequestContext) -> AppResult<AssetType> {
        data.validate()?;
        if self.repository.reference.asset_type_name_taken(data.name.trim(), Some(id)).await? {
            return Err(duplicate_name("An asset type"));
        }
        let asset_type = self
            .repository
            .reference
            .update_asset_type(id, &data)
            .await
            .map_err(|e| on_duplicate(e, "An asset type"))?;
        tracing::info!(asset_type_id = id, actor = ctx.user_id, "Asset type updated");
        Ok(asset_type)
    }

    pub async fn delete_asset_type(&self, id: i32, ctx: &RequestContext) -> AppResult<()> {
        let asset_type = self.repository.reference.get_asset_type(id).await?;
        let refs = self.repository.reference.asset_type_references(id).await?;
        if !refs.is_empty() {
            tracing::warn!(asset_type_id = id, assets = refs.assets, "Refused to delete referenced asset type");
            return Err(still_referenced("Asset type", &asset_type.name, refs));
        }
        self.repository
            .reference
            .delete_asset_type(id)
            .await
            .map_err(|e| referenced_since_check(e, "Asset type", &asset_type.name))?;
        tracing::info!(asset_type_id = id, actor = ctx.user_id, "Asset type deleted");
        Ok(())
    }

    // Manufacturers

    pub async fn list_manufacturers(&self) -> AppResult<Vec<Manufacturer>> {
        self.repository.reference.list_manufacturers().await
    }

    pub async fn get_manufacturer(&self, id: i32) -> AppResult<Manufacturer> {
        self.repository.reference.get_manufacturer(id).await
    }

    pub async fn create_manufacturer(&self, data: ManufacturerInput, ctx: &RequestContext) -> AppResult<Manufacturer> {
        data.validate()?;
        if self.repository.reference.manufacturer_name_taken(data.name.trim(), None).await? {
            return Err(duplicate_name("A manufacturer"));
        }
        let manufacturer = self
            .repository
            .reference
            .create_manufacturer(&data)
            .await
            .map_err(|e| on_duplicate(e, "A manufacturer"))?;
        tracing::info!(manufacturer_id = manufacturer.id, actor = ctx.user_id, "Manufacturer created");
        Ok(manufacturer)
    }

    pub async fn update_manufacturer(
        &self,
        id: i32,
        data: ManufacturerInput,
        ctx: &RequestContext,
    ) -> AppResult<Manufacturer> {
        data.validate()?;
        if self.repository.reference.manufacturer_name_taken(data.name.trim(), Some(id)).await? {
            return Err(duplicate_name("A manufacturer"));
        }
        let manufacturer = self
            .repository
            .reference
            .update_manufacturer(id, &data)
            .await
            .map_err(|e| on_duplicate(e, "A manufacturer"))?;
        tracing::info!(manufacturer_id = id, actor = ctx.user_id, "Manufacturer updated");
        Ok(manufacturer)
    }

    pub async fn delete_manufacturer(&self, id: i32, ctx: &RequestContext) -> AppResult<()> {
        let manufacturer = self.repository.reference.get_manufacturer(id).await?;
        let refs = self.repository.reference.manufacturer_references(id).await?;
        if !refs.is_empty() {
            tracing::warn!(manufacturer_id = id, assets = refs.assets, "Refused to delete referenced manufacturer");
            return Err(still_referenced("Manufacturer", &manufacturer.name, refs));
        }
        self.repository
            .reference
            .delete_manufacturer(id)
            .await
            .map_err(|e| referenced_since_check(e, "Manufacturer", &manufacturer.name))?;
        tracing::info!(manufacturer_id = id, actor = ctx.user_id, "Manufacturer deleted");
        Ok(())
    }

    // Certifications

    pub async fn list_certifications(&self) -> AppResult<Vec<Certification>> {
        self.repository.reference.list_certifications().await
    }

    pub async fn get_certification(&self, id: i32) -> AppResult<Certification> {
        self.repository.reference.get_certification(id).await
    }

    pub async fn create_certification(
        &self,
        data: CertificationInput,
        ctx: &RequestContext,
    ) -> AppResult<Certification> {
        data.validate()?;
        if self.repository.reference.certification_name_taken(data.name.trim(), None).await? {
            return Err(duplicate_name("A certification"));
        }
        let certification = self
            .repository
            .reference
            .create_certification(&data)
            .await
            .map_err(|e| on_duplicate(e, "A certification"))?;
        tracing::info!(certification_id = certification.id, actor = ctx.user_id, "Certification created");
        Ok(certification)
    }

    pub async fn update_certification(
        &self,
        id: i32,
        data: CertificationInput,
        ctx: &RequestContext,
    ) -> AppResult<Certification> {
        data.validate()?;
        if self.repository.reference.certification_name_taken(data.name.trim(), Some(id)).await? {
            return Err(duplicate_name("A certification"));
        }
        let certification = self
            .repository
            .reference
            .update_certification(id, &data)
            .await
            .map_err(|e| on_duplicate(e, "A certification"))?;
        tracing::info!(certification_id = id, actor = ctx.user_id, "Certification updated");
        Ok(certification)
    }

    /// Certifications are unlinked from their holders, never blocked
    pub async fn delete_certification(&self, id: i32, ctx: &RequestContext) -> AppResult<()> {
        self.repository.reference.delete_certification(id).await?;
        tracing::info!(certification_id = id, actor = ctx.user_id, "Certification deleted");
        Ok(())
    }
}

/// Map a unique violation that raced past the name check
fn on_duplicate(err: AppError, kind: &str) -> AppError {
    match err {
        AppError::Database(e) => {
            AppError::on_unique_violation(e, &format!("{} with this name already exists.", kind))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_referenced_message() {
        let err = still_referenced("Location", "Kampala", ReferenceCount { assets: 3, users: 1 });
        match err {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Location 'Kampala' is still referenced by 3 asset(s) and 1 user(s)")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = still_referenced("Manufacturer", "APC", ReferenceCount { assets: 2, users: 0 });
        assert_eq!(
            err.to_string(),
            "Conflict: Manufacturer 'APC' is still referenced by 2 asset(s)"
        );
    }

    #[test]
    fn test_referenced_since_check_keeps_other_errors() {
        let err = referenced_since_check(
            AppError::NotFound("Location not found".to_string()),
            "Location",
            "Kampala",
        );
        assert!(matches!(err, AppError::NotFound(_)));

        let err = referenced_since_check(
            AppError::Database(sqlx::Error::PoolTimedOut),
            "Location",
            "Kampala",
        );
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn test_duplicate_name_message() {
        assert_eq!(
            duplicate_name("An asset type").to_string(),
            "Validation error: An asset type with this name already exists."
        );
    }
}
