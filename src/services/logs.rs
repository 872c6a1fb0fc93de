//! Read access to the asset audit log

use crate::{
    error::AppResult,
    models::asset_log::{AssetLogEntry, AssetLogQuery},
    repository::{Page, Repository},
};

#[derive(Clone)]
pub struct LogsService {
    repository: Repository,
}

impl LogsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Logs of one asset, newest first
    pub async fn asset_logs(&self, tag: &str, page: Page) -> AppResult<(Vec<AssetLogEntry>, i64)> {
        let asset = self.repository.assets.get_by_tag(tag).await?;
        self.repository.logs.for_asset(asset.id, page).await
    }

    /// Logs across the inventory, newest first
    pub async fn recent_logs(&self, query: &AssetLogQuery) -> AppResult<(Vec<AssetLogEntry>, i64)> {
        self.repository.logs.list(query).await
    }
}
