//! Wire format error types

use thiserror::Error;

/// Errors raised while building or decoding entity documents
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid key arity: expected exactly 2 components (PartitionKey, RowKey), got {count}")]
    InvalidKeyArity { count: usize },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("xml write error: {0}")]
    XmlWrite(String),
}

impl WireError {
    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}
