//! Core errors

use thiserror::Error;

use encore_db::DbError;

/// Errors returned by the subscription core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad input parameters; nothing was written
    #[error("validation error: {0}")]
    Validation(String),

    /// Command is not legal for the subscription's current status
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// The subscription changed between read and write
    #[error("subscription was modified concurrently, re-read and retry")]
    Conflict,

    /// Storage failure
    #[error("store error: {0}")]
    Store(DbError),

    /// Webhook verification or parsing error
    #[error("webhook error: {0}")]
    Webhook(String),
}

/// Stable, machine-readable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CoreError::Validation`]
    Validation,
    /// See [`CoreError::PreconditionFailed`]
    PreconditionFailed,
    /// See [`CoreError::Conflict`]
    Conflict,
    /// See [`CoreError::Store`]
    Store,
    /// See [`CoreError::Webhook`]
    Webhook,
}

impl ErrorKind {
    /// Error code for API responses
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::Conflict => "CONFLICT",
            Self::Store => "STORE_ERROR",
            Self::Webhook => "WEBHOOK_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Machine-readable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Self::Conflict => ErrorKind::Conflict,
            Self::Store(_) => ErrorKind::Store,
            Self::Webhook(_) => ErrorKind::Webhook,
        }
    }

    /// Whether the same request may succeed after re-reading current state
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict => Self::Conflict,
            other => {
                tracing::error!("Store error: {}", other);
                Self::Store(other)
            }
        }
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
