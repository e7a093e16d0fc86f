//! botto-store: SQLite-backed record store for the botto motto bot.
//!
//! This crate provides store operations for:
//! - Member identity records (lazy creation, name/emoji reconciliation)
//! - Motto lifecycle records (pending → approved, duplicate lookup)
//! - Expiry pruning of unconfirmed mottos
//! - A parameterized filter builder shared by the scan-style queries

pub mod error;
pub mod members;
pub mod mottos;
pub mod query;
pub mod store;
mod sqlite_runtime;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use members::{Member, MemberRepository};
pub use mottos::{Motto, MottoRepository};
pub use query::{Filter, Value};
pub use store::BottoDbPool;

// Re-export test helpers when running tests or when the test-helpers
// feature is enabled
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
