//! Test helpers for the botto store.

use crate::{
    error::{StoreError, StoreResult},
    sqlite_runtime::create_in_memory_pool,
    store::BottoDbPool,
};

/// Create an in-memory botto store for testing
pub async fn create_test_pool() -> StoreResult<BottoDbPool> {
    let pool = create_in_memory_pool(1).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    Ok(BottoDbPool::from_pool(pool))
}
