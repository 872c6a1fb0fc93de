//! Maintenance records repository

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::MaintenanceStatus,
        maintenance::{
            CompleteMaintenance, MaintenanceListing, MaintenanceQuery, MaintenanceRecord,
            ScheduleMaintenance,
        },
    },
};

use super::Page;

const LISTING_SELECT: &str = r#"
    SELECT r.*,
           a.asset_tag,
           s.full_name AS scheduled_by_name,
           p.full_name AS performed_by_name
    FROM maintenance_records r
    JOIN assets a ON a.id = r.asset_id
    LEFT JOIN users s ON s.id = r.scheduled_by
    LEFT JOIN users p ON p.id = r.performed_by
"#;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Maintenance record {} not found", id))
}

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List records with filters, latest scheduled date first
    pub async fn list(
        &self,
        query: &MaintenanceQuery,
        today: NaiveDate,
    ) -> AppResult<(Vec<MaintenanceListing>, i64)> {
        let page = Page::new(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.asset_tag.is_some() {
            conditions.push(format!("UPPER(a.asset_tag) = UPPER(${})", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("r.status = ${}", idx));
            idx += 1;
        }
        if query.maintenance_type.is_some() {
            conditions.push(format!("r.maintenance_type = ${}", idx));
            idx += 1;
        }
        match query.overdue {
            Some(true) => conditions.push(format!(
                "r.status IN ('scheduled', 'in_progress') AND r.scheduled_date < ${}",
                idx
            )),
            Some(false) => conditions.push(format!(
                "NOT (r.status IN ('scheduled', 'in_progress') AND r.scheduled_date < ${})",
                idx
            )),
            None => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        macro_rules! bind_filters {
            ($builder:ident) => {
                if let Some(ref t) = query.asset_tag { $builder = $builder.bind(t.trim()); }
                if let Some(s) = query.status { $builder = $builder.bind(s); }
                if let Some(t) = query.maintenance_type { $builder = $builder.bind(t); }
                if query.overdue.is_some() { $builder = $builder.bind(today); }
            };
        }

        let count_q = format!(
            "SELECT COUNT(*) FROM maintenance_records r JOIN assets a ON a.id = r.asset_id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        bind_filters!(count_builder);
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "{} {} ORDER BY r.scheduled_date DESC, r.id DESC LIMIT {} OFFSET {}",
            LISTING_SELECT,
            where_clause,
            page.per_page,
            page.offset()
        );
        let mut builder = sqlx::query_as::<_, MaintenanceListing>(&select_q);
        bind_filters!(builder);
        let rows = builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<MaintenanceListing> {
        let query = format!("{} WHERE r.id = $1", LISTING_SELECT);
        sqlx::query_as::<_, MaintenanceListing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Records of one asset, latest scheduled first; all of them when `limit` is `None`
    pub async fn for_asset(&self, asset_id: i32, limit: Option<i64>) -> AppResult<Vec<MaintenanceListing>> {
        let query = format!(
            "{} WHERE r.asset_id = $1 ORDER BY r.scheduled_date DESC, r.id DESC LIMIT $2",
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, MaintenanceListing>(&query)
            .bind(asset_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Most recently performed records
    pub async fn recent_performed(&self, limit: i64) -> AppResult<Vec<MaintenanceListing>> {
        let query = format!(
            r#"
            {}
            WHERE r.performed_date IS NOT NULL
            ORDER BY r.performed_date DESC, r.id DESC
            LIMIT $1
            "#,
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, MaintenanceListing>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Read and lock a record for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenance_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        data: &ScheduleMaintenance,
        scheduled_by: i32,
    ) -> AppResult<MaintenanceRecord> {
        let row = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenance_records (
                asset_id, maintenance_type, status, scheduled_date, scheduled_by,
                description, cost, estimated_duration_minutes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(data.maintenance_type)
        .bind(MaintenanceStatus::Scheduled)
        .bind(data.scheduled_date)
        .bind(scheduled_by)
        .bind(&data.description)
        .bind(data.cost)
        .bind(data.estimated_duration_minutes)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: i32,
        status: MaintenanceStatus,
    ) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>(
            "UPDATE maintenance_records SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Mark completed; `data` has been cleaned so `performed_date` is set
    pub async fn complete(
        &self,
        conn: &mut PgConnection,
        id: i32,
        data: &CompleteMaintenance,
        performed_by: i32,
    ) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            UPDATE maintenance_records SET
                status = $1,
                performed_date = $2,
                performed_by = $3,
                work_performed = $4,
                parts_used = $5,
                cost = COALESCE($6, cost),
                actual_duration_minutes = $7,
                next_maintenance_date = $8,
                notes = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(MaintenanceStatus::Completed)
        .bind(data.performed_date)
        .bind(performed_by)
        .bind(&data.work_performed)
        .bind(&data.parts_used)
        .bind(data.cost)
        .bind(data.actual_duration_minutes)
        .bind(data.next_maintenance_date)
        .bind(&data.notes)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Mark cancelled, appending the reason to the notes
    pub async fn cancel(
        &self,
        conn: &mut PgConnection,
        id: i32,
        reason: Option<&str>,
    ) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            UPDATE maintenance_records SET
                status = $1,
                notes = CASE
                    WHEN $2::text IS NULL THEN notes
                    WHEN notes = '' THEN 'Cancelled: ' || $2::text
                    ELSE notes || E'\n' || 'Cancelled: ' || $2::text
                END,
                updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(MaintenanceStatus::Cancelled)
        .bind(reason)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }
}
