//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The stored version moved between read and write
    #[error("concurrent modification detected")]
    Conflict,

    /// A stored row could not be mapped to a domain type
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result alias for store operations
pub type DbResult<T> = Result<T, DbError>;
