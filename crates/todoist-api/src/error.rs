//! Error types for the Todoist API client.

use std::fmt;

/// Errors reported by the Todoist API itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-success HTTP status. `body` is the raw response text, untouched.
    Http { status: u16, body: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP error {}", status)
                } else {
                    write!(f, "HTTP error {}: {}", status, body)
                }
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Returns the HTTP status of the rejection.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
        }
    }
}

/// Top-level error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with an error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success body that could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the `(status, body)` pair when the API rejected the request.
    pub fn as_rejection(&self) -> Option<(u16, &str)> {
        match self {
            Error::Api(ApiError::Http { status, body }) => Some((*status, body.as_str())),
            Error::Http(_) | Error::Json(_) => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
