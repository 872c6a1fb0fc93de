//! Maintenance scheduling and lifecycle

use chrono::NaiveDate;

use crate::{
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        asset_log::NewAssetLog,
        enums::{LogEventType, MaintenanceStatus, MaintenanceType},
        maintenance::{
            CancelMaintenance, CompleteMaintenance, MaintenanceQuery, MaintenanceView,
            ScheduleMaintenance,
        },
    },
    repository::Repository,
};

pub fn scheduled_description(kind: MaintenanceType, date: NaiveDate) -> String {
    format!("{} scheduled for {}", kind.label(), date)
}

pub fn completed_description(kind: MaintenanceType, date: NaiveDate) -> String {
    format!("{} completed on {}", kind.label(), date)
}

pub fn cancelled_description(kind: MaintenanceType, date: NaiveDate, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{} scheduled for {} cancelled: {}", kind.label(), date, reason),
        None => format!("{} scheduled for {} cancelled", kind.label(), date),
    }
}

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        query: &MaintenanceQuery,
        ctx: &RequestContext,
    ) -> AppResult<(Vec<MaintenanceView>, i64)> {
        let (rows, total) = self.repository.maintenance.list(query, ctx.today).await?;
        let views = rows
            .into_iter()
            .map(|listing| MaintenanceView::new(listing, ctx.today))
            .collect();
        Ok((views, total))
    }

    pub async fn get(&self, id: i32, ctx: &RequestContext) -> AppResult<MaintenanceView> {
        let listing = self.repository.maintenance.get(id).await?;
        Ok(MaintenanceView::new(listing, ctx.today))
    }

    /// All records of an asset, latest scheduled first
    pub async fn asset_maintenance(&self, tag: &str, ctx: &RequestContext) -> AppResult<Vec<MaintenanceView>> {
        let asset = self.repository.assets.get_by_tag(tag).await?;
        let rows = self.repository.maintenance.for_asset(asset.id, None).await?;
        Ok(rows
            .into_iter()
            .map(|listing| MaintenanceView::new(listing, ctx.today))
            .collect())
    }

    /// Schedule maintenance on an asset that is in service
    pub async fn schedule(&self, data: ScheduleMaintenance, ctx: &RequestContext) -> AppResult<MaintenanceView> {
        let data = data.clean(ctx.today)?;

        let mut tx = self.repository.pool.begin().await?;
        let asset = self.repository.assets.lock_by_tag(&mut tx, &data.asset_tag).await?;
        if !asset.status.accepts_maintenance() {
            return Err(AppError::Validation(format!(
                "Maintenance cannot be scheduled for asset {} while it is {}.",
                asset.asset_tag,
                asset.status.label()
            )));
        }

        let record = self
            .repository
            .maintenance
            .create(&mut tx, asset.id, &data, ctx.user_id)
            .await?;
        let entry = NewAssetLog::new(
            LogEventType::MaintenanceScheduled,
            scheduled_description(record.maintenance_type, record.scheduled_date),
        );
        self.repository
            .logs
            .append(&mut tx, asset.id, Some(ctx.user_id), &entry)
            .await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            maintenance_id = record.id,
            actor = ctx.user_id,
            "Maintenance scheduled"
        );
        self.get(record.id, ctx).await
    }

    /// scheduled -> in_progress
    pub async fn start(&self, id: i32, ctx: &RequestContext) -> AppResult<MaintenanceView> {
        let mut tx = self.repository.pool.begin().await?;
        let record = self.repository.maintenance.lock(&mut tx, id).await?;
        record.check_transition(MaintenanceStatus::InProgress)?;
        self.repository
            .maintenance
            .set_status(&mut tx, id, MaintenanceStatus::InProgress)
            .await?;
        tx.commit().await?;

        tracing::info!(maintenance_id = id, actor = ctx.user_id, "Maintenance started");
        self.get(id, ctx).await
    }

    /// Close the record and carry its dates over to the asset
    pub async fn complete(
        &self,
        id: i32,
        data: CompleteMaintenance,
        ctx: &RequestContext,
    ) -> AppResult<MaintenanceView> {
        let data = data.clean(ctx.today)?;
        let performed = data.performed_date.unwrap_or(ctx.today);

        let mut tx = self.repository.pool.begin().await?;
        let record = self.repository.maintenance.lock(&mut tx, id).await?;
        record.check_transition(MaintenanceStatus::Completed)?;
        let asset = self.repository.assets.lock_by_id(&mut tx, record.asset_id).await?;

        let record = self
            .repository
            .maintenance
            .complete(&mut tx, id, &data, ctx.user_id)
            .await?;
        self.repository
            .assets
            .record_maintenance(&mut tx, asset.id, performed, data.next_maintenance_date)
            .await?;

        let mut entry = NewAssetLog::new(
            LogEventType::MaintenanceCompleted,
            completed_description(record.maintenance_type, performed),
        );
        if let Some(next) = data.next_maintenance_date {
            let old = asset.next_maintenance.map(|d| d.to_string()).unwrap_or_default();
            entry = entry.with_values(old, next.to_string());
        }
        self.repository
            .logs
            .append(&mut tx, asset.id, Some(ctx.user_id), &entry)
            .await?;
        tx.commit().await?;

        tracing::info!(
            asset_tag = %asset.asset_tag,
            maintenance_id = id,
            actor = ctx.user_id,
            "Maintenance completed"
        );
        self.get(id, ctx).await
    }

    pub async fn cancel(
        &self,
        id: i32,
        data: CancelMaintenance,
        ctx: &RequestContext,
    ) -> AppResult<MaintenanceView> {
        let reason = data
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        let mut tx = self.repository.pool.begin().await?;
        let record = self.repository.maintenance.lock(&mut tx, id).await?;
        record.check_transition(MaintenanceStatus::Cancelled)?;

        let record = self.repository.maintenance.cancel(&mut tx, id, reason).await?;
        let entry = NewAssetLog::new(
            LogEventType::Updated,
            cancelled_description(record.maintenance_type, record.scheduled_date, reason),
        );
        self.repository
            .logs
            .append(&mut tx, record.asset_id, Some(ctx.user_id), &entry)
            .await?;
        tx.commit().await?;

        tracing::info!(maintenance_id = id, actor = ctx.user_id, "Maintenance cancelled");
        self.get(id, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_descriptions() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            scheduled_description(MaintenanceType::Preventive, date),
            "Preventive Maintenance scheduled for 2024-07-01"
        );
        assert_eq!(
            completed_description(MaintenanceType::Inspection, date),
            "Inspection completed on 2024-07-01"
        );
        assert_eq!(
            cancelled_description(MaintenanceType::Calibration, date, Some("vendor delay")),
            "Calibration scheduled for 2024-07-01 cancelled: vendor delay"
        );
        assert_eq!(
            cancelled_description(MaintenanceType::Calibration, date, None),
            "Calibration scheduled for 2024-07-01 cancelled"
        );
    }
}
