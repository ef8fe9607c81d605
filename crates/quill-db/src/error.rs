//! Error types for the quill-db crate.
//!
//! Wraps `SQLx` errors with additional context and detects uniqueness
//! violations so the orchestrator can surface them as account conflicts.

use quill_core::ProvisionError;
use thiserror::Error;

/// PostgreSQL error code for unique constraint violations.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to establish or acquire a database connection.
    #[error("store connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A schema migration failed to apply.
    #[error("migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A query failed to execute.
    #[error("query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// A unique constraint rejected the write (duplicate username/email).
    #[error("duplicate key on {constraint}")]
    DuplicateKey { constraint: String },

    /// Row not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store backend is unreachable or refused the operation.
    /// Covers non-SQL implementations of the store contract.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify a query-time sqlx error, detecting unique violations.
    #[must_use]
    pub fn from_query(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return StoreError::DuplicateKey {
                    constraint: db_err.constraint().unwrap_or("unique").to_string(),
                };
            }
        }
        StoreError::QueryFailed(err)
    }

    /// Check if this error is a uniqueness conflict.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, StoreError::ConnectionFailed(_))
    }

    /// Check if this error indicates a missing row.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<StoreError> for ProvisionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { ref constraint } => {
                ProvisionError::duplicate_account(constraint.clone()).with_source(err)
            }
            StoreError::NotFound(ref what) => {
                ProvisionError::user_not_found(what.clone()).with_source(err)
            }
            StoreError::ConnectionFailed(_)
            | StoreError::MigrationFailed(_)
            | StoreError::QueryFailed(_)
            | StoreError::Unavailable(_) => {
                ProvisionError::provider_unavailable(format!("user store failure: {err}"))
                    .with_source(err)
            }
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
