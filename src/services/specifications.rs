//! Specification set of an asset, every change audited

use validator::Validate;

use crate::{
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        asset_log::NewAssetLog,
        enums::LogEventType,
        specification::{AssetSpecification, UpsertSpecification},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SpecificationsService {
    repository: Repository,
}

impl SpecificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, tag: &str) -> AppResult<Vec<AssetSpecification>> {
        let asset = self.repository.assets.get_by_tag(tag).await?;
        self.repository.specifications.list(asset.id).await
    }

    /// Insert or replace by name, logging old and new display values
    pub async fn upsert(
        &self,
        tag: &str,
        mut data: UpsertSpecification,
        ctx: &RequestContext,
    ) -> AppResult<AssetSpecification> {
        data.specification_name = data.specification_name.trim().to_string();
        data.specification_value = data.specification_value.trim().to_string();
        data.unit = data.unit.trim().to_string();
        data.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, tag).await?;
        let previous = self
            .repository
            .specifications
            .find(&mut tx, asset.id, &data.specification_name)
            .await?;

        let spec = self
            .repository
            .specifications
            .upsert(&mut tx, asset.id, &data)
            .await?;

        let (verb, old_value) = match previous {
            Some(ref p) => ("updated", p.display_value()),
            None => ("added", String::new()),
        };
        let entry = NewAssetLog::new(
            LogEventType::SpecificationUpdated,
            format!("Specification '{}' {}", spec.specification_name, verb),
        )
        .with_values(old_value, spec.display_value());
        self.repository
            .logs
            .append(&mut tx, asset.id, Some(ctx.user_id), &entry)
            .await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            specification = %spec.specification_name,
            actor = ctx.user_id,
            "Specification saved"
        );
        Ok(spec)
    }

    /// Remove a specification by name
    pub async fn delete(&self, tag: &str, name: &str, ctx: &RequestContext) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, tag).await?;
        let spec = self
            .repository
            .specifications
            .find(&mut tx, asset.id, name.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Specification '{}' not found on asset {}",
                    name, asset.asset_tag
                ))
            })?;

        self.repository.specifications.delete(&mut tx, spec.id).await?;
        let entry = NewAssetLog::new(
            LogEventType::SpecificationUpdated,
            format!("Specification '{}' removed", spec.specification_name),
        )
        .with_values(spec.display_value(), "");
        self.repository
            .logs
            .append(&mut tx, asset.id, Some(ctx.user_id), &entry)
            .await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            specification = %spec.specification_name,
            actor = ctx.user_id,
            "Specification removed"
        );
        Ok(())
    }
}
