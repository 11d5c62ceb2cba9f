//! Typed property values and wire type coercion
//!
//! Every entity property travels as element text plus an optional
//! `m:type` attribute naming the wire type. Untyped values are plain
//! strings with no attribute; null values carry `m:null="true"` and an
//! empty body.

use crate::error::WireError;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};

/// Wire type tag carried in the `m:type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdmType {
    Int32,
    Int64,
    Double,
    Boolean,
    DateTime,
    Binary,
}

impl EdmType {
    /// Attribute value for this tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::Double => "Edm.Double",
            Self::Boolean => "Edm.Boolean",
            Self::DateTime => "Edm.DateTime",
            Self::Binary => "Edm.Binary",
        }
    }

    /// Parse an `m:type` attribute value
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Edm.Int32" => Some(Self::Int32),
            "Edm.Int64" => Some(Self::Int64),
            "Edm.Double" => Some(Self::Double),
            "Edm.Boolean" => Some(Self::Boolean),
            "Edm.DateTime" => Some(Self::DateTime),
            "Edm.Binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// A typed entity property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Untyped default; emitted without an `m:type` attribute
    String(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    /// UTC instant; wire precision is whole seconds
    DateTime(DateTime<Utc>),
    /// Raw byte sequence; base64 on the wire
    Binary(Vec<u8>),
    /// Serialized as `m:null="true"` with an empty element body
    Null,
}

impl PropertyValue {
    /// Wire type tag for this value; `None` for untyped strings and null
    #[must_use]
    pub fn edm_type(&self) -> Option<EdmType> {
        match self {
            Self::String(_) | Self::Null => None,
            Self::Int32(_) => Some(EdmType::Int32),
            Self::Int64(_) => Some(EdmType::Int64),
            Self::Double(_) => Some(EdmType::Double),
            Self::Boolean(_) => Some(EdmType::Boolean),
            Self::DateTime(_) => Some(EdmType::DateTime),
            Self::Binary(_) => Some(EdmType::Binary),
        }
    }

    /// Wire text for this value; `None` for null
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Int32(v) => Some(v.to_string()),
            Self::Int64(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::Boolean(v) => Some(v.to_string()),
            Self::DateTime(t) => Some(format_wire_datetime(*t)),
            Self::Binary(b) => Some(BASE64.encode(b)),
            Self::Null => None,
        }
    }

    /// Whether this value serializes with the is-null marker
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Decode wire text back into a value, selecting the rule from the
    /// type tag when one was present
    pub fn decode(tag: Option<EdmType>, text: &str, is_null: bool) -> Result<Self, WireError> {
        if is_null {
            return Ok(Self::Null);
        }
        let Some(tag) = tag else {
            return Ok(Self::String(text.to_string()));
        };
        match tag {
            EdmType::Int32 => text
                .parse()
                .map(Self::Int32)
                .map_err(|_| WireError::malformed(format!("invalid Edm.Int32 value: {text}"))),
            EdmType::Int64 => text
                .parse()
                .map(Self::Int64)
                .map_err(|_| WireError::malformed(format!("invalid Edm.Int64 value: {text}"))),
            EdmType::Double => text
                .parse()
                .map(Self::Double)
                .map_err(|_| WireError::malformed(format!("invalid Edm.Double value: {text}"))),
            EdmType::Boolean => match text {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                _ => Err(WireError::malformed(format!(
                    "invalid Edm.Boolean value: {text}"
                ))),
            },
            EdmType::DateTime => parse_wire_datetime(text).map(Self::DateTime),
            EdmType::Binary => BASE64
                .decode(text)
                .map(Self::Binary)
                .map_err(|e| WireError::malformed(format!("invalid Edm.Binary value: {e}"))),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

/// Format a UTC instant in the service's fixed-width date form
/// (`2024-01-01T12:00:00.0000000Z`); sub-second precision is truncated
#[must_use]
pub fn format_wire_datetime(t: DateTime<Utc>) -> String {
    format!("{}.0000000Z", t.format("%Y-%m-%dT%H:%M:%S"))
}

fn parse_wire_datetime(text: &str) -> Result<DateTime<Utc>, WireError> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| WireError::malformed(format!("invalid Edm.DateTime value: {text}")))
}
