//! Error types for squill

use thiserror::Error;

/// Result type alias for squill operations
pub type SquillResult<T> = Result<T, SquillError>;

/// Error types for statement compilation and connection lifecycle
#[derive(Debug, Error)]
pub enum SquillError {
    /// The connection is missing a required configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Physical link failure on open or during post-connect initialization
    #[error("Connection error: {message} (code {code})")]
    Connection { message: String, code: i32 },

    /// The dialect has no registered driver
    #[error("No driver registered for dialect '{0}'")]
    UnsupportedDialect(String),

    /// Unknown operator keyword or wrong operand arity in a condition
    #[error("Condition syntax error: {0}")]
    ConditionSyntax(String),

    /// Malformed join/insert/update specification
    #[error("Structural error: {0}")]
    Structural(String),

    /// Commit/rollback on a transaction that already reached a terminal state
    #[error("Transaction is no longer active")]
    InactiveTransaction,
}

impl SquillError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a condition syntax error
    pub fn condition(message: impl Into<String>) -> Self {
        Self::ConditionSyntax(message.into())
    }

    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Check if this is a condition syntax error
    pub fn is_condition_syntax(&self) -> bool {
        matches!(self, Self::ConditionSyntax(_))
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is an unsupported dialect error
    pub fn is_unsupported_dialect(&self) -> bool {
        matches!(self, Self::UnsupportedDialect(_))
    }
}
