use thiserror::Error;

/// Errors surfaced by the data accessors.
///
/// Every failure is returned to the caller as-is; nothing is retried. The split between
/// [`ConnectionError`](DbHelperError::ConnectionError) and
/// [`StatementError`](DbHelperError::StatementError) follows the phase the call was in:
/// anything before the login completes is a connection failure, anything after is a
/// statement failure.
#[derive(Debug, Error)]
pub enum DbHelperError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Statement error: {0}")]
    StatementError(String),

    /// The blocking accessor could not start its runtime.
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl DbHelperError {
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }

    #[must_use]
    pub fn is_statement_error(&self) -> bool {
        matches!(self, Self::StatementError(_))
    }
}

pub type Result<T> = std::result::Result<T, DbHelperError>;
