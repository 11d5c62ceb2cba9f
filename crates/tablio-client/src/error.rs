//! Error types for the table service adapter

use tablio_atom::WireError;
use tablio_auth::AuthError;
use thiserror::Error;

/// Common result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error type
///
/// Every failure surfaces exactly once; nothing is retried or swallowed
/// at this layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Wire format failure, including key arity violations raised
    /// before any request is sent
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Network or HTTP-layer failure, surfaced unchanged
    #[error("transport error: {0}")]
    Transport(String),

    /// The addressed entity does not exist; a normal, recoverable
    /// outcome distinct from transport failures
    #[error("entity not found: {resource}")]
    NotFound { resource: String },

    /// The backend answered with a status this layer does not interpret
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: http::StatusCode, body: String },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a malformed response error
    #[must_use]
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::Wire(WireError::MalformedResponse(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_not_found() {
        let err = Error::NotFound {
            resource: "Person(PartitionKey='p1', RowKey='r1')".into(),
        };
        assert!(err.is_not_found());
        assert!(!Error::transport("timed out").is_not_found());
    }

    #[test]
    fn test_error_malformed_response() {
        let err = Error::from(WireError::malformed("bad body"));
        assert!(err.is_malformed_response());
        assert!(!err.is_not_found());
    }
}
