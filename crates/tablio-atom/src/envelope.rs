//! Atom entry envelope builder and entity serializer
//!
//! The service accepts exactly one document shape: an Atom `entry` with
//! fixed header elements and an `m:properties` block inside `content`.
//! Property elements are dynamically named after the entity's fields,
//! so the document is built with the event writer rather than a derived
//! serializer.

use std::io;

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::entity::{Entity, EntityKey, PARTITION_KEY, ROW_KEY};
use crate::error::WireError;
use crate::value::{PropertyValue, format_wire_datetime};

/// Atom namespace, bound as the default namespace on `entry`
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Metadata namespace, prefix `m`; must match the backend byte-for-byte
pub const METADATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
/// Data namespace, prefix `d`; must match the backend byte-for-byte
pub const DATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";

/// Build the request body for an entity operation
///
/// `self_link` is the entity's canonical resource URL and is only set
/// for updates, where it fills the `id` element; inserts leave `id`
/// empty. Key fields are serialized first, untyped; data fields follow
/// in insertion order, and a data field named after a key component is
/// skipped.
pub fn entry_document(
    updated: DateTime<Utc>,
    self_link: Option<&str>,
    key: &EntityKey,
    data: &Entity,
) -> Result<String, WireError> {
    let mut writer = Writer::new(Vec::new());
    write_entry(&mut writer, updated, self_link, key, data)?;
    String::from_utf8(writer.into_inner()).map_err(|e| WireError::XmlWrite(e.to_string()))
}

fn emit<W: io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), WireError> {
    writer
        .write_event(event)
        .map_err(|e| WireError::XmlWrite(e.to_string()))
}

fn write_entry<W: io::Write>(
    writer: &mut Writer<W>,
    updated: DateTime<Utc>,
    self_link: Option<&str>,
    key: &EntityKey,
    data: &Entity,
) -> Result<(), WireError> {
    emit(writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))))?;

    let mut entry = BytesStart::new("entry");
    entry.push_attribute(("xmlns:d", DATA_NS));
    entry.push_attribute(("xmlns:m", METADATA_NS));
    entry.push_attribute(("xmlns", ATOM_NS));
    emit(writer, Event::Start(entry))?;

    emit(writer, Event::Empty(BytesStart::new("title")))?;
    emit(writer, Event::Start(BytesStart::new("author")))?;
    emit(writer, Event::Empty(BytesStart::new("name")))?;
    emit(writer, Event::End(BytesEnd::new("author")))?;

    match self_link {
        Some(url) => write_text_element(writer, "id", url)?,
        None => emit(writer, Event::Empty(BytesStart::new("id")))?,
    }
    write_text_element(writer, "updated", &format_wire_datetime(updated))?;

    let mut content = BytesStart::new("content");
    content.push_attribute(("type", "application/xml"));
    emit(writer, Event::Start(content))?;
    write_properties(writer, key, data)?;
    emit(writer, Event::End(BytesEnd::new("content")))?;

    emit(writer, Event::End(BytesEnd::new("entry")))
}

fn write_properties<W: io::Write>(
    writer: &mut Writer<W>,
    key: &EntityKey,
    data: &Entity,
) -> Result<(), WireError> {
    emit(writer, Event::Start(BytesStart::new("m:properties")))?;

    // Key components first; always plain strings on the wire.
    write_property(writer, PARTITION_KEY, &PropertyValue::String(key.partition_key.clone()))?;
    write_property(writer, ROW_KEY, &PropertyValue::String(key.row_key.clone()))?;

    for (name, value) in data.iter() {
        if name == PARTITION_KEY || name == ROW_KEY {
            continue;
        }
        write_property(writer, name, value)?;
    }

    emit(writer, Event::End(BytesEnd::new("m:properties")))
}

fn write_property<W: io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &PropertyValue,
) -> Result<(), WireError> {
    let qualified = format!("d:{name}");
    let mut element = BytesStart::new(qualified.as_str());
    if let Some(tag) = value.edm_type() {
        element.push_attribute(("m:type", tag.as_str()));
    }
    match value.render() {
        Some(text) => {
            emit(writer, Event::Start(element))?;
            emit(writer, Event::Text(BytesText::new(&text)))?;
            emit(writer, Event::End(BytesEnd::new(qualified.as_str())))
        }
        None => {
            element.push_attribute(("m:null", "true"));
            emit(writer, Event::Empty(element))
        }
    }
}

fn write_text_element<W: io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), WireError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}
