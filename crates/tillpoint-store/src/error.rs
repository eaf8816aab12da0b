//! # Storage Error Types

use thiserror::Error;

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open or create the backing database.
    #[error("Failed to open store: {0}")]
    OpenFailed(String),

    /// Schema migration failed.
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// A read or write query failed.
    #[error("Store query failed: {0}")]
    QueryFailed(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}
