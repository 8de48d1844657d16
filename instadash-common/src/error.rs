//! Common error types for instadash

use thiserror::Error;

/// Common result type for instadash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the API server and the admin CLI
#[derive(Error, Debug)]
pub enum Error {
    /// Local database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transport-level HTTP failure (connect, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Hosted store answered with a non-success status
    #[error("Store error ({status}): {message}")]
    Store { status: u16, message: String },

    /// External API (completion, workflow automation) answered with a non-success status
    #[error("Remote API error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error classes surfaced at the HTTP boundary
///
/// DEGRADED outcomes are not errors: they travel as a flag on a successful
/// result (see [`crate::services::punctuation::Punctuation`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any store call
    Validation,
    /// No row matched the identifier
    NotFound,
    /// Store, transport or remote API failure
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code used in error envelopes
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl Error {
    /// Classify this error for the response boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Database(_)
            | Error::Http(_)
            | Error::Store { .. }
            | Error::Remote { .. }
            | Error::Io(_)
            | Error::Config(_)
            | Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::InvalidInput("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::Store { status: 503, message: "down".into() }.kind(),
            ErrorKind::Internal
        );
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_store_error_display_includes_status() {
        let err = Error::Store { status: 409, message: "duplicate key".into() };
        assert_eq!(err.to_string(), "Store error (409): duplicate key");
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::NotFound.code(), "NOT_FOUND");
        assert_eq!(ErrorKind::Internal.code(), "INTERNAL_ERROR");
    }
}
