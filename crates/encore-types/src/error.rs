//! Parse errors for domain enums and value types

use thiserror::Error;

/// Error parsing a domain value from its string form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown subscription type
    #[error("invalid subscription type: {0}")]
    SubscriptionType(String),

    /// Unknown history action
    #[error("invalid history action: {0}")]
    HistoryAction(String),

    /// Not a three-letter currency code
    #[error("invalid currency code: {0}")]
    Currency(String),
}
