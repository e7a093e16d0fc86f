//! botto store connection pool and initialization.

use std::path::PathBuf;

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    error::{StoreError, StoreResult},
    sqlite_runtime::create_file_pool,
};

/// botto store pool wrapper
#[derive(Debug, Clone)]
pub struct BottoDbPool {
    pool: SqlitePool,
}

impl BottoDbPool {
    /// Initialize the store with migrations
    ///
    /// Ensures the data directory exists, creates/connects to the
    /// database file and runs migrations.
    pub async fn new() -> StoreResult<Self> {
        let db_path = Self::db_path()?;
        info!("Initializing botto store at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let pool = create_file_pool(&db_path, 5).await?;

        Self::run_migrations(&pool).await?;

        info!("botto store initialized successfully");
        Ok(Self { pool })
    }

    /// Get the inner SQLx pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file path
    pub fn db_path() -> StoreResult<PathBuf> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(data_dir.join("botto").join("botto.sqlite3"))
    }

    /// Run database migrations using the sqlx migrate macro
    async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("botto store migrations completed");
        Ok(())
    }

    /// Close the pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create a BottoDbPool from an existing SqlitePool (for testing)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}
