//! Authentication error types

use thiserror::Error;

/// Request signing errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing x-ms-date header")]
    MissingDateHeader,

    #[error("header value is not valid ascii")]
    InvalidHeaderValue,

    #[error("invalid account key: {0}")]
    InvalidAccountKey(String),
}
