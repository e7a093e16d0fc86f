//! Record store error types.

/// Store operation errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQL error from sqlx
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Member not found
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Motto not found
    #[error("Motto not found: {0}")]
    MottoNotFound(String),

    /// Config/data directory not found
    #[error("Config/data directory not found")]
    NoDataDir,

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
