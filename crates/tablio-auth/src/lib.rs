//! Tablio Authentication
//!
//! This crate provides:
//! - The [`RequestSigner`] capability the client dispatches through
//! - Account credentials management
//! - SharedKeyLite HMAC-SHA256 request signing

pub mod credentials;
pub mod error;
pub mod signer;

// Re-export core types
pub use credentials::StorageCredentials;
pub use error::AuthError;
pub use signer::{RequestSigner, SharedKeyLiteSigner};
