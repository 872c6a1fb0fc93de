//! Assets repository

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetInput, AssetListing, AssetQuery},
        enums::AssetStatus,
        reference::AssetTypeCount,
        summary::AssetHealthRow,
    },
};

use super::Page;

/// Asset columns plus the names of its references
const LISTING_SELECT: &str = r#"
    SELECT a.*,
           t.name AS asset_type_name,
           m.name AS manufacturer_name,
           l.name AS location_name,
           u.full_name AS assigned_to_name
    FROM assets a
    JOIN asset_types t ON t.id = a.asset_type_id
    JOIN manufacturers m ON m.id = a.manufacturer_id
    JOIN locations l ON l.id = a.location_id
    LEFT JOIN users u ON u.id = a.assigned_to_id
"#;

fn not_found(tag: &str) -> AppError {
    AppError::NotFound(format!("Asset {} not found", tag))
}

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List assets with filters, ordered by tag
    pub async fn list(&self, query: &AssetQuery, today: NaiveDate) -> AppResult<(Vec<AssetListing>, i64)> {
        let page = Page::new(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.status.is_some() {
            conditions.push(format!("a.status = ${}", idx));
            idx += 1;
        }
        if query.priority.is_some() {
            conditions.push(format!("a.priority = ${}", idx));
            idx += 1;
        }
        if query.asset_type.is_some() {
            conditions.push(format!("LOWER(t.name) = LOWER(${})", idx));
            idx += 1;
        }
        if query.location.is_some() {
            conditions.push(format!("LOWER(l.name) = LOWER(${})", idx));
            idx += 1;
        }
        if query.assigned_to.is_some() {
            conditions.push(format!("a.assigned_to_id = ${}", idx));
            idx += 1;
        }
        match query.maintenance_due {
            Some(true) => {
                conditions.push(format!("a.next_maintenance <= ${}", idx));
                idx += 1;
            }
            Some(false) => {
                conditions.push(format!(
                    "(a.next_maintenance IS NULL OR a.next_maintenance > ${})",
                    idx
                ));
                idx += 1;
            }
            None => {}
        }
        if query.search.is_some() {
            conditions.push(format!(
                "(a.asset_tag ILIKE ${0} OR a.name ILIKE ${0} OR a.serial_number ILIKE ${0} OR a.description ILIKE ${0})",
                idx
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let search = query.search.as_ref().map(|s| format!("%{}%", s.trim()));

        macro_rules! bind_filters {
            ($builder:ident) => {
                if let Some(s) = query.status { $builder = $builder.bind(s); }
                if let Some(p) = query.priority { $builder = $builder.bind(p); }
                if let Some(ref t) = query.asset_type { $builder = $builder.bind(t); }
                if let Some(ref l) = query.location { $builder = $builder.bind(l); }
                if let Some(u) = query.assigned_to { $builder = $builder.bind(u); }
                if query.maintenance_due.is_some() { $builder = $builder.bind(today); }
                if let Some(ref s) = search { $builder = $builder.bind(s); }
            };
        }

        let count_q = format!(
            r#"
            SELECT COUNT(*)
            FROM assets a
            JOIN asset_types t ON t.id = a.asset_type_id
            JOIN locations l ON l.id = a.location_id
            {}
            "#,
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        bind_filters!(count_builder);
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "{} {} ORDER BY a.asset_tag LIMIT {} OFFSET {}",
            LISTING_SELECT,
            where_clause,
            page.per_page,
            page.offset()
        );
        let mut builder = sqlx::query_as::<_, AssetListing>(&select_q);
        bind_filters!(builder);
        let rows = builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn list_by_type(&self, asset_type_id: i32) -> AppResult<Vec<AssetListing>> {
        let query = format!("{} WHERE a.asset_type_id = $1 ORDER BY a.asset_tag", LISTING_SELECT);
        let rows = sqlx::query_as::<_, AssetListing>(&query)
            .bind(asset_type_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_assignee(&self, user_id: i32) -> AppResult<Vec<AssetListing>> {
        let query = format!("{} WHERE a.assigned_to_id = $1 ORDER BY a.asset_tag", LISTING_SELECT);
        let rows = sqlx::query_as::<_, AssetListing>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Other assets of the same type at the same location, plus anything else
    /// held by the same assignee
    pub async fn related(&self, asset: &Asset) -> AppResult<Vec<AssetListing>> {
        let query = format!(
            r#"
            {}
            WHERE a.id <> $1
              AND ((a.location_id = $2 AND a.asset_type_id = $3) OR a.assigned_to_id = $4)
            ORDER BY a.asset_tag
            "#,
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, AssetListing>(&query)
            .bind(asset.id)
            .bind(asset.location_id)
            .bind(asset.asset_type_id)
            .bind(asset.assigned_to_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Not decommissioned, next maintenance on or before `today`, most overdue first
    pub async fn maintenance_due(&self, today: NaiveDate, limit: i64) -> AppResult<Vec<AssetListing>> {
        let query = format!(
            r#"
            {}
            WHERE a.next_maintenance <= $1 AND a.status <> $2
            ORDER BY a.next_maintenance, a.asset_tag
            LIMIT $3
            "#,
            LISTING_SELECT
        );
        let rows = sqlx::query_as::<_, AssetListing>(&query)
            .bind(today)
            .bind(AssetStatus::Decommissioned)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get asset by tag, case-insensitive
    pub async fn get_by_tag(&self, tag: &str) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE UPPER(asset_tag) = UPPER($1)")
            .bind(tag.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(tag))
    }

    pub async fn get_listing_by_tag(&self, tag: &str) -> AppResult<AssetListing> {
        let query = format!("{} WHERE UPPER(a.asset_tag) = UPPER($1)", LISTING_SELECT);
        sqlx::query_as::<_, AssetListing>(&query)
            .bind(tag.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(tag))
    }

    /// Read and lock the asset row for the rest of the transaction
    pub async fn lock_by_tag(&self, conn: &mut PgConnection, tag: &str) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE UPPER(asset_tag) = UPPER($1) FOR UPDATE",
        )
        .bind(tag.trim())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(tag))
    }

    pub async fn lock_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    pub async fn tag_exists(&self, tag: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE UPPER(asset_tag) = UPPER($1) AND id IS DISTINCT FROM $2)",
        )
        .bind(tag)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn serial_exists(&self, serial: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE serial_number = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(serial)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a cleaned asset
    pub async fn create(&self, conn: &mut PgConnection, data: &AssetInput) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                asset_tag, serial_number, name, asset_type_id, manufacturer_id,
                model_number, location_id, assigned_to_id, status, priority,
                purchase_date, installation_date, warranty_expiry,
                last_maintenance, next_maintenance, description, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(&data.asset_tag)
        .bind(&data.serial_number)
        .bind(&data.name)
        .bind(data.asset_type_id)
        .bind(data.manufacturer_id)
        .bind(&data.model_number)
        .bind(data.location_id)
        .bind(data.assigned_to_id)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.purchase_date)
        .bind(data.installation_date)
        .bind(data.warranty_expiry)
        .bind(data.last_maintenance)
        .bind(data.next_maintenance)
        .bind(&data.description)
        .bind(&data.notes)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Overwrite every editable column; `created_at` is left untouched
    pub async fn update(&self, conn: &mut PgConnection, id: i32, data: &AssetInput) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets SET
                asset_tag = $1, serial_number = $2, name = $3, asset_type_id = $4,
                manufacturer_id = $5, model_number = $6, location_id = $7,
                assigned_to_id = $8, status = $9, priority = $10,
                purchase_date = $11, installation_date = $12, warranty_expiry = $13,
                last_maintenance = $14, next_maintenance = $15,
                description = $16, notes = $17, updated_at = NOW()
            WHERE id = $18
            RETURNING *
            "#,
        )
        .bind(&data.asset_tag)
        .bind(&data.serial_number)
        .bind(&data.name)
        .bind(data.asset_type_id)
        .bind(data.manufacturer_id)
        .bind(&data.model_number)
        .bind(data.location_id)
        .bind(data.assigned_to_id)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.purchase_date)
        .bind(data.installation_date)
        .bind(data.warranty_expiry)
        .bind(data.last_maintenance)
        .bind(data.next_maintenance)
        .bind(&data.description)
        .bind(&data.notes)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    pub async fn set_assignee(
        &self,
        conn: &mut PgConnection,
        id: i32,
        assigned_to_id: Option<i32>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE assets SET assigned_to_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(assigned_to_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, conn: &mut PgConnection, id: i32, status: AssetStatus) -> AppResult<()> {
        sqlx::query("UPDATE assets SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Stamp completed maintenance; `next` keeps the current value when `None`
    pub async fn record_maintenance(
        &self,
        conn: &mut PgConnection,
        id: i32,
        performed: NaiveDate,
        next: Option<NaiveDate>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE assets SET
                last_maintenance = $1,
                next_maintenance = COALESCE($2, next_maintenance),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(performed)
        .bind(next)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Remove the asset and everything it owns
    pub async fn delete_with_dependents(&self, conn: &mut PgConnection, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM asset_specifications WHERE asset_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM maintenance_records WHERE asset_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM asset_logs WHERE asset_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset with id {} not found", id)));
        }
        Ok(())
    }

    /// The columns the health and status summaries are computed from
    pub async fn health_rows(&self) -> AppResult<Vec<AssetHealthRow>> {
        let rows = sqlx::query_as::<_, AssetHealthRow>(
            "SELECT asset_tag, name, status, priority, next_maintenance FROM assets ORDER BY asset_tag",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every asset type with its number of assets, largest first
    pub async fn count_by_type(&self) -> AppResult<Vec<AssetTypeCount>> {
        let rows = sqlx::query_as::<_, AssetTypeCount>(
            r#"
            SELECT t.id, t.name, COUNT(a.id) AS asset_count
            FROM asset_types t
            LEFT JOIN assets a ON a.asset_type_id = t.id
            GROUP BY t.id, t.name
            ORDER BY asset_count DESC, t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
