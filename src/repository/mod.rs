//! Repository layer for database operations
//!
//! Read methods run on the pool. Methods that take a `&mut PgConnection` are
//! meant to be called with the caller's transaction so that a write and its
//! audit log row commit together.

pub mod asset_logs;
pub mod assets;
pub mod maintenance;
pub mod reference;
pub mod specifications;
pub mod users;

use sqlx::{Pool, Postgres};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: i64 = 20;
/// Largest page size a client may request
pub const MAX_PER_PAGE: i64 = 100;

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Saturates for absurd page numbers, which then read past the last row
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub reference: reference::ReferenceRepository,
    pub assets: assets::AssetsRepository,
    pub specifications: specifications::SpecificationsRepository,
    pub logs: asset_logs::AssetLogsRepository,
    pub maintenance: maintenance::MaintenanceRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            reference: reference::ReferenceRepository::new(pool.clone()),
            assets: assets::AssetsRepository::new(pool.clone()),
            specifications: specifications::SpecificationsRepository::new(pool.clone()),
            logs: asset_logs::AssetLogsRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database, used by the readiness check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(Page::new(None, None), Page { page: 1, per_page: DEFAULT_PER_PAGE });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, per_page: 1 });
        assert_eq!(Page::new(Some(3), Some(500)).per_page, MAX_PER_PAGE);
        assert_eq!(Page::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(Page::new(Some(i64::MAX), Some(100)).offset(), i64::MAX);
    }
}
