//! Database error types

use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record exists but has been soft-deleted.
    #[error("Deleted: {0}")]
    Deleted(String),
}

impl DbError {
    /// True for errors caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, DbError::InvalidInput(_))
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
