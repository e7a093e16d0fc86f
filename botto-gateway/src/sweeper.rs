//! Probabilistic expiry sweep for unconfirmed mottos.
//!
//! The sweep runs on a fraction of eligible incoming channel messages
//! rather than a timer, which bounds store query volume to chat
//! activity. It never emits a chat-visible effect.

use botto_store::{MottoRepository, StoreResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

/// Fraction of eligible messages that trigger a sweep.
pub const SWEEP_PROBABILITY: f64 = 0.1;

/// Maybe run a sweep; called once per eligible channel message.
pub async fn maybe_sweep(pool: &SqlitePool, expiry_hours: i64) {
    if rand::random::<f64>() >= SWEEP_PROBABILITY {
        return;
    }

    if let Err(e) = sweep_now(pool, expiry_hours, Utc::now().timestamp()).await {
        warn!("Expiry sweep failed: {}", e);
    }
}

/// Delete pending mottos older than `expiry_hours`; returns the count.
pub async fn sweep_now(pool: &SqlitePool, expiry_hours: i64, now: i64) -> StoreResult<u64> {
    let cutoff = now - expiry_hours * 3600;
    MottoRepository::delete_stale_pending(pool, cutoff).await
}
