//! Infrastructure layer for Expert Roster
//!
//! This crate provides implementations for:
//! - Database access (PostgreSQL with sqlx)
//! - Profile store implementations backing the application's store port
//!
//! ## Usage
//!
//! ```rust,ignore
//! use expert_roster_infrastructure::{DatabaseConfig, DatabasePool, PgProfileStore};
//!
//! let db_config = DatabaseConfig::from_settings(&settings.database)?;
//! let pool = DatabasePool::new(&db_config).await?;
//! pool.migrate().await?;
//!
//! let store = PgProfileStore::new(pool.pool().clone());
//! ```

pub mod database;
pub mod repositories;

// Re-export commonly used types
pub use database::{DatabaseConfig, DatabasePool};
pub use repositories::{InMemoryProfileStore, InMemoryUnitOfWork, PgProfileStore, PgUnitOfWork};

use expert_roster_application::ApplicationError;

// Re-export result and error types
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored value that does not decode into a domain type
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Classify a sqlx error raised by a write, surfacing unique violations
    /// as conflicts
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(db_err.message().to_string())
            }
            _ => Error::Database(err),
        }
    }
}

impl From<Error> for ApplicationError {
    fn from(err: Error) -> Self {
        match err {
            Error::Conflict(msg) => ApplicationError::Conflict(msg),
            Error::NotFound(msg) => ApplicationError::NotFound(msg),
            Error::Database(sqlx::Error::PoolTimedOut) => {
                ApplicationError::Timeout("Timed out acquiring a database connection".to_string())
            }
            Error::Database(sqlx::Error::RowNotFound) => {
                ApplicationError::NotFound("Row not found".to_string())
            }
            err @ Error::Database(_) => ApplicationError::ServiceUnavailable(err.to_string()),
            err => ApplicationError::Internal(err.to_string()),
        }
    }
}
