//! Audit log repository
//!
//! Rows are only ever inserted; there is no update or delete here.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        asset_log::{AssetLog, AssetLogEntry, AssetLogQuery, NewAssetLog},
        enums::LogEventType,
    },
};

use super::Page;

const ENTRY_SELECT: &str = r#"
    SELECT g.*, a.asset_tag, u.full_name AS user_name
    FROM asset_logs g
    JOIN assets a ON a.id = g.asset_id
    LEFT JOIN users u ON u.id = g.user_id
"#;

#[derive(Clone)]
pub struct AssetLogsRepository {
    pool: Pool<Postgres>,
}

impl AssetLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one row on the caller's transaction
    pub async fn append(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        user_id: Option<i32>,
        entry: &NewAssetLog,
    ) -> AppResult<AssetLog> {
        let row = sqlx::query_as::<_, AssetLog>(
            r#"
            INSERT INTO asset_logs (asset_id, event_type, description, user_id, old_value, new_value)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(entry.event_type)
        .bind(&entry.description)
        .bind(user_id)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn get_entry(&self, id: i32) -> AppResult<AssetLogEntry> {
        let query = format!("{} WHERE g.id = $1", ENTRY_SELECT);
        sqlx::query_as::<_, AssetLogEntry>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Log entry {} not found", id)))
    }

    /// Logs of one asset, newest first
    pub async fn for_asset(&self, asset_id: i32, page: Page) -> AppResult<(Vec<AssetLogEntry>, i64)> {
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM asset_logs WHERE asset_id = $1")
            .bind(asset_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "{} WHERE g.asset_id = $1 ORDER BY g.timestamp DESC, g.id DESC LIMIT {} OFFSET {}",
            ENTRY_SELECT,
            page.per_page,
            page.offset()
        );
        let rows = sqlx::query_as::<_, AssetLogEntry>(&query)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total))
    }

    /// Logs across all assets, newest first
    pub async fn list(&self, query: &AssetLogQuery) -> AppResult<(Vec<AssetLogEntry>, i64)> {
        let page = Page::new(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.event_type.is_some() {
            conditions.push(format!("g.event_type = ${}", idx));
            idx += 1;
        }
        if query.user_id.is_some() {
            conditions.push(format!("g.user_id = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM asset_logs g {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(et) = query.event_type { count_builder = count_builder.bind(et); }
        if let Some(uid) = query.user_id { count_builder = count_builder.bind(uid); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "{} {} ORDER BY g.timestamp DESC, g.id DESC LIMIT {} OFFSET {}",
            ENTRY_SELECT,
            where_clause,
            page.per_page,
            page.offset()
        );
        let mut builder = sqlx::query_as::<_, AssetLogEntry>(&select_q);
        if let Some(et) = query.event_type { builder = builder.bind(et); }
        if let Some(uid) = query.user_id { builder = builder.bind(uid); }
        let rows = builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn latest(&self, limit: i64) -> AppResult<Vec<AssetLogEntry>> {
        let query = format!("{} ORDER BY g.timestamp DESC, g.id DESC LIMIT $1", ENTRY_SELECT);
        let rows = sqlx::query_as::<_, AssetLogEntry>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Incidents and status changes logged for the asset since `since`
    pub async fn count_issues_since(&self, asset_id: i32, since: DateTime<Utc>) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM asset_logs
            WHERE asset_id = $1 AND event_type IN ($2, $3) AND timestamp >= $4
            "#,
        )
        .bind(asset_id)
        .bind(LogEventType::IncidentReported)
        .bind(LogEventType::StatusChange)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
