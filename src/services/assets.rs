//! Asset lifecycle: validated create/edit with audit, assignment, incidents, delete

use chrono::Duration;
use sqlx::PgConnection;
use validator::Validate;

use crate::{
    context::RequestContext,
    error::{reference_must_exist, AppError, AppResult},
    models::{
        asset::{
            recommendations, Asset, AssetDetails, AssetInput, AssetQuery, AssetView, AssignmentResult,
            IncidentContext, Recommendation, ReportIncident, INCIDENT_LOG_LIMIT,
            INCIDENT_MAINTENANCE_LIMIT, RECENT_ISSUE_WINDOW_DAYS,
        },
        asset_log::{AssetLogEntry, NewAssetLog},
        enums::{AssetStatus, LogEventType},
        maintenance::MaintenanceView,
    },
    repository::{Page, Repository},
};

pub const TAG_TAKEN: &str = "An asset with this tag already exists.";
pub const SERIAL_TAKEN: &str = "An asset with this serial number already exists.";

/// Rows shown on the asset detail page
const DETAIL_MAINTENANCE_LIMIT: i64 = 10;
const DETAIL_LOG_LIMIT: i64 = 10;

/// What an edit changed, in log precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    StatusChange { old: AssetStatus, new: AssetStatus },
    Reassigned { old: Option<i32>, new: Option<i32> },
    Updated(Vec<&'static str>),
}

impl EditEvent {
    /// Status wins over assignment, assignment over any other field
    pub fn classify(current: &Asset, input: &AssetInput) -> Self {
        if current.status != input.status {
            EditEvent::StatusChange {
                old: current.status,
                new: input.status,
            }
        } else if current.assigned_to_id != input.assigned_to_id {
            EditEvent::Reassigned {
                old: current.assigned_to_id,
                new: input.assigned_to_id,
            }
        } else {
            EditEvent::Updated(input.changed_fields(current))
        }
    }
}

/// Map a unique violation that raced past the pre-checks to the matching message
fn on_duplicate(err: AppError) -> AppError {
    match err {
        AppError::Database(e) => {
            let message = match e.as_database_error().and_then(|db| db.constraint()) {
                Some(constraint) if constraint.contains("serial") => SERIAL_TAKEN,
                _ => TAG_TAKEN,
            };
            AppError::on_unique_violation(e, message)
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
}

impl AssetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &AssetQuery, ctx: &RequestContext) -> AppResult<(Vec<AssetView>, i64)> {
        let (listings, total) = self.repository.assets.list(query, ctx.today).await?;
        let views = listings
            .into_iter()
            .map(|listing| AssetView::new(listing, ctx.today))
            .collect();
        Ok((views, total))
    }

    pub async fn get(&self, tag: &str, ctx: &RequestContext) -> AppResult<AssetView> {
        let listing = self.repository.assets.get_listing_by_tag(tag).await?;
        Ok(AssetView::new(listing, ctx.today))
    }

    /// Asset with specifications, latest maintenance and latest logs
    pub async fn details(&self, tag: &str, ctx: &RequestContext) -> AppResult<AssetDetails> {
        let asset = self.get(tag, ctx).await?;
        let asset_id = asset.listing.asset.id;

        let specifications = self.repository.specifications.list(asset_id).await?;
        let maintenance_records = self
            .repository
            .maintenance
            .for_asset(asset_id, Some(DETAIL_MAINTENANCE_LIMIT))
            .await?
            .into_iter()
            .map(|listing| MaintenanceView::new(listing, ctx.today))
            .collect();
        let page = Page::new(Some(1), Some(DETAIL_LOG_LIMIT));
        let (recent_logs, _) = self.repository.logs.for_asset(asset_id, page).await?;

        Ok(AssetDetails {
            asset,
            specifications,
            maintenance_records,
            recent_logs,
        })
    }

    /// Recent history, location and incident-relevant specifications of an asset
    pub async fn incident_context(&self, tag: &str, ctx: &RequestContext) -> AppResult<IncidentContext> {
        let asset = self.get(tag, ctx).await?;
        let asset_id = asset.listing.asset.id;

        let location = self
            .repository
            .reference
            .get_location(asset.listing.asset.location_id)
            .await?;
        let recent_maintenance = self
            .repository
            .maintenance
            .for_asset(asset_id, Some(INCIDENT_MAINTENANCE_LIMIT))
            .await?
            .into_iter()
            .map(|listing| MaintenanceView::new(listing, ctx.today))
            .collect();
        let page = Page::new(Some(1), Some(INCIDENT_LOG_LIMIT));
        let (recent_logs, _) = self.repository.logs.for_asset(asset_id, page).await?;
        let specifications = self.repository.specifications.list(asset_id).await?;

        Ok(IncidentContext::new(
            asset,
            location,
            recent_maintenance,
            recent_logs,
            specifications,
        ))
    }

    /// Assets an incident on `tag` may also affect
    pub async fn related(&self, tag: &str, ctx: &RequestContext) -> AppResult<Vec<AssetView>> {
        let asset = self.repository.assets.get_by_tag(tag).await?;
        let rows = self.repository.assets.related(&asset).await?;
        Ok(rows
            .into_iter()
            .map(|listing| AssetView::new(listing, ctx.today))
            .collect())
    }

    /// Checks that need the database: unique tag and serial, existing references,
    /// active assignee. `exclude_id` is the asset being edited.
    async fn validate_references(&self, input: &AssetInput, exclude_id: Option<i32>) -> AppResult<()> {
        if self.repository.assets.tag_exists(&input.asset_tag, exclude_id).await? {
            return Err(AppError::Validation(TAG_TAKEN.to_string()));
        }
        if let Some(ref serial) = input.serial_number {
            if self.repository.assets.serial_exists(serial, exclude_id).await? {
                return Err(AppError::Validation(SERIAL_TAKEN.to_string()));
            }
        }

        let reference = &self.repository.reference;
        reference_must_exist(reference.get_asset_type(input.asset_type_id).await, || {
            format!("Asset type {} does not exist", input.asset_type_id)
        })?;
        reference_must_exist(reference.get_manufacturer(input.manufacturer_id).await, || {
            format!("Manufacturer {} does not exist", input.manufacturer_id)
        })?;
        reference_must_exist(reference.get_location(input.location_id).await, || {
            format!("Location {} does not exist", input.location_id)
        })?;

        if let Some(user_id) = input.assigned_to_id {
            match self.repository.users.find(user_id).await? {
                None => {
                    return Err(AppError::Validation(format!("User {} does not exist", user_id)))
                }
                Some(user) if !user.is_active => {
                    return Err(AppError::Validation(format!(
                        "{} is inactive and cannot be assigned assets",
                        user.full_name
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Display name for an assignee, `None` when unassigned or gone
    async fn assignee_name(&self, user_id: Option<i32>) -> AppResult<Option<String>> {
        match user_id {
            Some(id) => Ok(self.repository.users.find(id).await?.map(|u| u.full_name)),
            None => Ok(None),
        }
    }

    async fn append_log(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        ctx: &RequestContext,
        entry: &NewAssetLog,
    ) -> AppResult<i32> {
        let log = self
            .repository
            .logs
            .append(conn, asset_id, Some(ctx.user_id), entry)
            .await?;
        Ok(log.id)
    }

    /// Validate and insert a new asset with its `created` log
    pub async fn create(&self, input: AssetInput, ctx: &RequestContext) -> AppResult<AssetView> {
        let input = input.clean()?;
        self.validate_references(&input, None).await?;

        let mut tx = self.repository.pool.begin().await?;
        let asset = self
            .repository
            .assets
            .create(&mut tx, &input)
            .await
            .map_err(on_duplicate)?;
        self.append_log(&mut tx, asset.id, ctx, &NewAssetLog::created()).await?;
        tx.commit().await?;

        tracing::info!(asset_tag = %asset.asset_tag, actor = ctx.user_id, "Asset created");
        self.get(&asset.asset_tag, ctx).await
    }

    /// Validate and save an edit, appending exactly one log row
    pub async fn update(&self, tag: &str, input: AssetInput, ctx: &RequestContext) -> AppResult<AssetView> {
        let input = input.clean()?;

        let mut tx = self.repository.pool.begin().await?;
        let current = self.repository.assets.lock_by_tag(&mut tx, tag).await?;
        self.validate_references(&input, Some(current.id)).await?;

        let entry = match EditEvent::classify(&current, &input) {
            EditEvent::StatusChange { old, new } => NewAssetLog::status_change(old, new),
            EditEvent::Reassigned { old, new } => {
                let old_name = self.assignee_name(old).await?;
                let new_name = self.assignee_name(new).await?;
                NewAssetLog::assignment(old_name.as_deref(), new_name.as_deref())
            }
            EditEvent::Updated(fields) => NewAssetLog::updated(&fields),
        };

        let asset = self
            .repository
            .assets
            .update(&mut tx, current.id, &input)
            .await
            .map_err(on_duplicate)?;
        self.append_log(&mut tx, asset.id, ctx, &entry).await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            event = entry.event_type.as_str(),
            actor = ctx.user_id,
            "Asset updated"
        );
        self.get(&asset.asset_tag, ctx).await
    }

    /// Assign to a user or unassign; no write and no log when the assignee is unchanged
    pub async fn assign(
        &self,
        tag: &str,
        assigned_to_id: Option<i32>,
        ctx: &RequestContext,
    ) -> AppResult<AssignmentResult> {
        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, tag).await?;

        let new_name = match assigned_to_id {
            Some(user_id) => {
                let user = self.repository.users.get_by_id(user_id).await?;
                if !user.is_active {
                    return Err(AppError::Validation(format!(
                        "{} is inactive and cannot be assigned assets",
                        user.full_name
                    )));
                }
                Some(user.full_name)
            }
            None => None,
        };

        if asset.assigned_to_id == assigned_to_id {
            tx.rollback().await?;
            return Ok(AssignmentResult {
                asset: self.get(&asset.asset_tag, ctx).await?,
                log: None,
            });
        }

        let old_name = self.assignee_name(asset.assigned_to_id).await?;
        let entry = NewAssetLog::assignment(old_name.as_deref(), new_name.as_deref());

        self.repository
            .assets
            .set_assignee(&mut tx, asset.id, assigned_to_id)
            .await?;
        let log_id = self.append_log(&mut tx, asset.id, ctx, &entry).await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            assigned_to = ?assigned_to_id,
            actor = ctx.user_id,
            "Asset reassigned"
        );
        Ok(AssignmentResult {
            asset: self.get(&asset.asset_tag, ctx).await?,
            log: Some(self.repository.logs.get_entry(log_id).await?),
        })
    }

    /// Record an incident, optionally marking the asset faulty in the same write
    pub async fn report_incident(
        &self,
        tag: &str,
        report: ReportIncident,
        ctx: &RequestContext,
    ) -> AppResult<AssetLogEntry> {
        report.validate()?;
        let description = report.description.trim();
        if description.is_empty() {
            return Err(AppError::Validation("Incident description is required".to_string()));
        }

        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, tag).await?;

        let mut entry = NewAssetLog::new(LogEventType::IncidentReported, description);
        if report.mark_faulty && asset.status != AssetStatus::Faulty {
            self.repository
                .assets
                .set_status(&mut tx, asset.id, AssetStatus::Faulty)
                .await?;
            entry = entry.with_values(asset.status.as_str(), AssetStatus::Faulty.as_str());
        }
        let log_id = self.append_log(&mut tx, asset.id, ctx, &entry).await?;
        tx.commit().await?;

        tracing::warn!(asset_tag = %asset.asset_tag, actor = ctx.user_id, "Incident reported");
        self.repository.logs.get_entry(log_id).await
    }

    /// Remove the asset together with its specifications, logs and maintenance
    pub async fn delete(&self, tag: &str, ctx: &RequestContext) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, tag).await?;
        self.repository
            .assets
            .delete_with_dependents(&mut tx, asset.id)
            .await?;
        tx.commit().await?;

        tracing::info!(asset_tag = %asset.asset_tag, actor = ctx.user_id, "Asset deleted");
        Ok(())
    }

    pub async fn recommendations(&self, tag: &str, ctx: &RequestContext) -> AppResult<Vec<Recommendation>> {
        let asset = self.repository.assets.get_by_tag(tag).await?;
        let since = ctx.request_time - Duration::days(RECENT_ISSUE_WINDOW_DAYS);
        let recent_issues = self
            .repository
            .logs
            .count_issues_since(asset.id, since)
            .await?;
        Ok(recommendations(&asset, recent_issues, ctx.today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::tests::sample_asset;

    fn input_from(asset: &Asset) -> AssetInput {
        AssetInput {
            asset_tag: asset.asset_tag.clone(),
            serial_number: asset.serial_number.clone(),
            name: asset.name.clone(),
            asset_type_id: asset.asset_type_id,
            manufacturer_id: asset.manufacturer_id,
            model_number: asset.model_number.clone(),
            location_id: asset.location_id,
            assigned_to_id: asset.assigned_to_id,
            status: asset.status,
            priority: asset.priority,
            purchase_date: asset.purchase_date,
            installation_date: asset.installation_date,
            warranty_expiry: asset.warranty_expiry,
            last_maintenance: asset.last_maintenance,
            next_maintenance: asset.next_maintenance,
            description: asset.description.clone(),
            notes: asset.notes.clone(),
        }
    }

    #[test]
    fn test_status_change_takes_precedence() {
        let current = sample_asset();
        let mut input = input_from(&current);
        input.status = AssetStatus::Maintenance;
        input.assigned_to_id = Some(4);
        input.notes = "PSU swap".to_string();

        assert_eq!(
            EditEvent::classify(&current, &input),
            EditEvent::StatusChange {
                old: AssetStatus::Active,
                new: AssetStatus::Maintenance
            }
        );
    }

    #[test]
    fn test_reassignment_before_plain_update() {
        let mut current = sample_asset();
        current.assigned_to_id = Some(2);
        let mut input = input_from(&current);
        input.assigned_to_id = Some(3);
        input.name = "Renamed UPS".to_string();

        assert_eq!(
            EditEvent::classify(&current, &input),
            EditEvent::Reassigned {
                old: Some(2),
                new: Some(3)
            }
        );
    }

    #[test]
    fn test_plain_update_lists_fields() {
        let current = sample_asset();
        let mut input = input_from(&current);
        input.priority = crate::models::enums::AssetPriority::Critical;
        input.description = "Feeds hall B".to_string();

        assert_eq!(
            EditEvent::classify(&current, &input),
            EditEvent::Updated(vec!["priority", "description"])
        );
        assert_eq!(
            EditEvent::classify(&current, &input_from(&current)),
            EditEvent::Updated(vec![])
        );
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = on_duplicate(AppError::NotFound("x".to_string()));
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
