//! Health summary, status counts and dashboard

use crate::{
    context::RequestContext,
    error::AppResult,
    models::{
        asset::AssetView,
        maintenance::MaintenanceView,
        summary::{Dashboard, HealthSummary, StatusSummary},
    },
    repository::Repository,
};

const DASHBOARD_MAINTENANCE: i64 = 5;
const DASHBOARD_DUE: i64 = 5;
const DASHBOARD_LOGS: i64 = 10;

#[derive(Clone)]
pub struct SummaryService {
    repository: Repository,
}

impl SummaryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn health(&self, ctx: &RequestContext) -> AppResult<HealthSummary> {
        let rows = self.repository.assets.health_rows().await?;
        Ok(HealthSummary::compute(&rows, ctx.today))
    }

    pub async fn status(&self) -> AppResult<StatusSummary> {
        let rows = self.repository.assets.health_rows().await?;
        let mut summary = StatusSummary::default();
        for row in &rows {
            summary.add(row.status);
        }
        Ok(summary)
    }

    pub async fn dashboard(&self, ctx: &RequestContext) -> AppResult<Dashboard> {
        let counts = self.status().await?;
        let assets_by_type = self.repository.assets.count_by_type().await?;
        let recent_maintenance = self
            .repository
            .maintenance
            .recent_performed(DASHBOARD_MAINTENANCE)
            .await?
            .into_iter()
            .map(|listing| MaintenanceView::new(listing, ctx.today))
            .collect();
        let maintenance_due = self
            .repository
            .assets
            .maintenance_due(ctx.today, DASHBOARD_DUE)
            .await?
            .into_iter()
            .map(|listing| AssetView::new(listing, ctx.today))
            .collect();
        let recent_logs = self.repository.logs.latest(DASHBOARD_LOGS).await?;

        Ok(Dashboard {
            total_assets: counts.total,
            active_assets: counts.active,
            maintenance_assets: counts.maintenance,
            faulty_assets: counts.faulty,
            assets_by_type,
            recent_maintenance,
            maintenance_due,
            recent_logs,
        })
    }
}
