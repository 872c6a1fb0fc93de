//! Asset specifications repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::specification::{AssetSpecification, UpsertSpecification},
};

#[derive(Clone)]
pub struct SpecificationsRepository {
    pool: Pool<Postgres>,
}

impl SpecificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All specifications of an asset, ordered by name
    pub async fn list(&self, asset_id: i32) -> AppResult<Vec<AssetSpecification>> {
        let rows = sqlx::query_as::<_, AssetSpecification>(
            "SELECT * FROM asset_specifications WHERE asset_id = $1 ORDER BY specification_name",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        name: &str,
    ) -> AppResult<Option<AssetSpecification>> {
        let row = sqlx::query_as::<_, AssetSpecification>(
            "SELECT * FROM asset_specifications WHERE asset_id = $1 AND specification_name = $2",
        )
        .bind(asset_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Insert, or replace the value and unit of the same-named specification
    pub async fn upsert(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        data: &UpsertSpecification,
    ) -> AppResult<AssetSpecification> {
        let row = sqlx::query_as::<_, AssetSpecification>(
            r#"
            INSERT INTO asset_specifications (asset_id, specification_name, specification_value, unit)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (asset_id, specification_name)
            DO UPDATE SET specification_value = EXCLUDED.specification_value, unit = EXCLUDED.unit
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(&data.specification_name)
        .bind(&data.specification_value)
        .bind(&data.unit)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM asset_specifications WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
