//! Tablio Atom - Atom/OData entity wire format
//!
//! This crate implements the wire format the table service speaks:
//! typed entity properties, composite keys, the Atom entry envelope
//! sent on insert/update, and the parser that turns a returned entry
//! back into a typed entity.

pub mod entity;
pub mod envelope;
pub mod error;
pub mod parse;
pub mod value;

// Re-exports
pub use entity::{Entity, EntityKey, PARTITION_KEY, ROW_KEY};
pub use envelope::{ATOM_NS, DATA_NS, METADATA_NS, entry_document};
pub use error::WireError;
pub use parse::parse_entry;
pub use value::{EdmType, PropertyValue, format_wire_datetime};
