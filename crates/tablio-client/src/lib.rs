//! Tablio Client - table service storage adapter
//!
//! Translates generic insert/update/delete/find operations against a
//! logical table and a composite `(PartitionKey, RowKey)` key into
//! signed HTTP requests carrying Atom entity bodies, and parses find
//! responses back into typed entities.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tablio_client::{
//!     AdapterConfig, Entity, EntityKey, ReqwestTransport, SharedKeyLiteSigner,
//!     StorageCredentials, TableAdapter,
//! };
//!
//! let credentials = StorageCredentials::from_env().expect("credentials");
//! let adapter = TableAdapter::new(
//!     AdapterConfig::new(credentials.account()),
//!     Arc::new(SharedKeyLiteSigner::new(credentials)),
//!     Arc::new(ReqwestTransport::new()?),
//! );
//!
//! let key = EntityKey::new("p1", "r1");
//! adapter.insert("Person", &key, &Entity::new().with("Age", 30)).await?;
//! let person = adapter.find("Person", &key).await?;
//! ```

pub mod adapter;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod transport;

// Re-exports
pub use adapter::TableAdapter;
pub use config::AdapterConfig;
pub use error::{Error, Result};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// Wire format and signing types callers need alongside the adapter
pub use tablio_atom::{EdmType, Entity, EntityKey, PropertyValue, WireError};
pub use tablio_auth::{AuthError, RequestSigner, SharedKeyLiteSigner, StorageCredentials};
