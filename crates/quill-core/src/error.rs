//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Post not found: id {id}")]
    NotFound { id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,
}

/// Attachment store errors.
///
/// Removal of an already-missing file is NOT an error; `Remove` is reserved
/// for unexpected I/O failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Attachment write failed: {0}")]
    Write(String),

    #[error("Attachment removal failed: {0}")]
    Remove(String),
}
