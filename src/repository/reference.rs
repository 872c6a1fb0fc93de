//! Locations, asset types, manufacturers and certifications

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reference::{
        AssetType, AssetTypeInput, Certification, CertificationInput, Location, LocationInput,
        Manufacturer, ManufacturerInput,
    },
};

/// Rows pointing at a reference record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceCount {
    pub assets: i64,
    pub users: i64,
}

impl ReferenceCount {
    pub fn is_empty(&self) -> bool {
        self.assets == 0 && self.users == 0
    }
}

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: Pool<Postgres>,
}

impl ReferenceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// True when `name` is taken by another row of `table`
    async fn name_taken(&self, table: &str, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE LOWER(name) = LOWER($1) AND id IS DISTINCT FROM $2)",
            table
        );
        let exists = sqlx::query_scalar(&query)
            .bind(name)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn delete_row(&self, table: &str, label: &str, id: i32) -> AppResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", label, id)));
        }
        Ok(())
    }

    async fn count_assets_where(&self, column: &str, id: i32) -> AppResult<i64> {
        let query = format!("SELECT COUNT(*) FROM assets WHERE {} = $1", column);
        let count = sqlx::query_scalar(&query).bind(id).fetch_one(&self.pool).await?;
        Ok(count)
    }

    // Locations

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_location(&self, id: i32) -> AppResult<Location> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn location_name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        self.name_taken("locations", name, exclude_id).await
    }

    pub async fn create_location(&self, data: &LocationInput) -> AppResult<Location> {
        let row = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (name, country) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.name.trim())
        .bind(data.country.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_location(&self, id: i32, data: &LocationInput) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            "UPDATE locations SET name = $1, country = $2 WHERE id = $3 RETURNING *",
        )
        .bind(data.name.trim())
        .bind(data.country.trim())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn location_references(&self, id: i32) -> AppResult<ReferenceCount> {
        let assets = self.count_assets_where("location_id", id).await?;
        let users = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE location_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(ReferenceCount { assets, users })
    }

    pub async fn delete_location(&self, id: i32) -> AppResult<()> {
        self.delete_row("locations", "Location", id).await
    }

    // Asset types

    pub async fn list_asset_types(&self) -> AppResult<Vec<AssetType>> {
        let rows = sqlx::query_as::<_, AssetType>("SELECT * FROM asset_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_asset_type(&self, id: i32) -> AppResult<AssetType> {
        sqlx::query_as::<_, AssetType>("SELECT * FROM asset_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset type {} not found", id)))
    }

    pub async fn find_asset_type_by_name(&self, name: &str) -> AppResult<Option<AssetType>> {
        let row = sqlx::query_as::<_, AssetType>(
            "SELECT * FROM asset_types WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn asset_type_name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        self.name_taken("asset_types", name, exclude_id).await
    }

    pub async fn create_asset_type(&self, data: &AssetTypeInput) -> AppResult<AssetType> {
        let row = sqlx::query_as::<_, AssetType>(
            "INSERT INTO asset_types (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_asset_type(&self, id: i32, data: &AssetTypeInput) -> AppResult<AssetType> {
        sqlx::query_as::<_, AssetType>(
            "UPDATE asset_types SET name = $1, description = $2 WHERE id = $3 RETURNING *",
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset type {} not found", id)))
    }

    pub async fn asset_type_references(&self, id: i32) -> AppResult<ReferenceCount> {
        let assets = self.count_assets_where("asset_type_id", id).await?;
        Ok(ReferenceCount { assets, users: 0 })
    }

    pub async fn delete_asset_type(&self, id: i32) -> AppResult<()> {
        self.delete_row("asset_types", "Asset type", id).await
    }

    // Manufacturers

    pub async fn list_manufacturers(&self) -> AppResult<Vec<Manufacturer>> {
        let rows = sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_manufacturer(&self, id: i32) -> AppResult<Manufacturer> {
        sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Manufacturer {} not found", id)))
    }

    pub async fn manufacturer_name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        self.name_taken("manufacturers", name, exclude_id).await
    }

    pub async fn create_manufacturer(&self, data: &ManufacturerInput) -> AppResult<Manufacturer> {
        let row = sqlx::query_as::<_, Manufacturer>(
            r#"
            INSERT INTO manufacturers (name, website, support_contact)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.website)
        .bind(&data.support_contact)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_manufacturer(&self, id: i32, data: &ManufacturerInput) -> AppResult<Manufacturer> {
        sqlx::query_as::<_, Manufacturer>(
            r#"
            UPDATE manufacturers SET name = $1, website = $2, support_contact = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.website)
        .bind(&data.support_contact)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Manufacturer {} not found", id)))
    }

    pub async fn manufacturer_references(&self, id: i32) -> AppResult<ReferenceCount> {
        let assets = self.count_assets_where("manufacturer_id", id).await?;
        Ok(ReferenceCount { assets, users: 0 })
    }

    pub async fn delete_manufacturer(&self, id: i32) -> AppResult<()> {
        self.delete_row("manufacturers", "Manufacturer", id).await
    }

    // Certifications

    pub async fn list_certifications(&self) -> AppResult<Vec<Certification>> {
        let rows = sqlx::query_as::<_, Certification>("SELECT * FROM certifications ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_certification(&self, id: i32) -> AppResult<Certification> {
        sqlx::query_as::<_, Certification>("SELECT * FROM certifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Certification {} not found", id)))
    }

    /// IDs from `ids` that match no certification
    pub async fn missing_certifications(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let missing = sqlx::query_scalar(
            r#"
            SELECT wanted FROM UNNEST($1::int[]) AS wanted
            WHERE NOT EXISTS (SELECT 1 FROM certifications c WHERE c.id = wanted)
            ORDER BY wanted
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn certification_name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        self.name_taken("certifications", name, exclude_id).await
    }

    pub async fn create_certification(&self, data: &CertificationInput) -> AppResult<Certification> {
        let row = sqlx::query_as::<_, Certification>(
            "INSERT INTO certifications (name) VALUES ($1) RETURNING *",
        )
        .bind(data.name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_certification(&self, id: i32, data: &CertificationInput) -> AppResult<Certification> {
        sqlx::query_as::<_, Certification>(
            "UPDATE certifications SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(data.name.trim())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Certification {} not found", id)))
    }

    /// Holders lose the certification along with the row
    pub async fn delete_certification(&self, id: i32) -> AppResult<()> {
        self.delete_row("certifications", "Certification", id).await
    }
}
