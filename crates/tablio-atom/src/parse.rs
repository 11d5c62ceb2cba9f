//! Find-path response decoder
//!
//! Walks a returned Atom entry and rebuilds the entity from the
//! `m:properties` block, using each element's `m:type` attribute (when
//! present) to pick the decoding rule. Anything that does not look like
//! the expected shape is an error, never an empty entity.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::entity::Entity;
use crate::error::WireError;
use crate::value::{EdmType, PropertyValue};

struct PendingProperty {
    name: String,
    tag: Option<EdmType>,
    is_null: bool,
    text: String,
}

/// Parse an Atom entry body into an entity, in document order
pub fn parse_entry(body: &str) -> Result<Entity, WireError> {
    let mut reader = Reader::from_str(body);
    let mut entity = Entity::new();
    let mut in_properties = false;
    let mut seen_properties = false;
    let mut current: Option<PendingProperty> = None;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(WireError::malformed(format!(
                    "xml error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if current.is_some() {
                    return Err(WireError::malformed(format!(
                        "nested element inside property at position {}",
                        reader.buffer_position()
                    )));
                }
                if in_properties {
                    current = Some(pending_property(&e)?);
                } else if is_properties_element(&e) {
                    in_properties = true;
                    seen_properties = true;
                }
            }
            Ok(Event::Empty(e)) => {
                if in_properties {
                    let pending = pending_property(&e)?;
                    entity.insert(
                        pending.name,
                        PropertyValue::decode(pending.tag, "", pending.is_null)?,
                    );
                } else if is_properties_element(&e) {
                    seen_properties = true;
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(pending) = current.as_mut() {
                    let text = t
                        .decode()
                        .map_err(|e| WireError::malformed(format!("bad text content: {e}")))?;
                    pending.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(pending) = current.as_mut() {
                    let text = std::str::from_utf8(&t)
                        .map_err(|e| WireError::malformed(format!("bad cdata content: {e}")))?;
                    pending.text.push_str(text);
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some(pending) = current.as_mut() {
                    let name = std::str::from_utf8(&r)
                        .map_err(|e| WireError::malformed(format!("bad entity reference: {e}")))?;
                    let resolved = resolve_reference(name).ok_or_else(|| {
                        WireError::malformed(format!("unknown entity reference: &{name};"))
                    })?;
                    pending.text.push(resolved);
                }
            }
            Ok(Event::End(e)) => {
                if let Some(pending) = current.take() {
                    entity.insert(
                        pending.name,
                        PropertyValue::decode(pending.tag, &pending.text, pending.is_null)?,
                    );
                } else if in_properties && e.local_name().as_ref() == b"properties" {
                    in_properties = false;
                }
            }
            Ok(_) => {}
        }
    }

    if in_properties || current.is_some() {
        return Err(WireError::malformed("truncated response body"));
    }
    if !seen_properties {
        return Err(WireError::malformed(
            "response body has no properties element",
        ));
    }
    Ok(entity)
}

fn is_properties_element(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"properties"
}

/// Resolve a predefined or numeric character reference
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn pending_property(e: &BytesStart<'_>) -> Result<PendingProperty, WireError> {
    let name = String::from_utf8(e.local_name().as_ref().to_vec())
        .map_err(|_| WireError::malformed("property name is not valid utf-8"))?;

    let mut tag = None;
    let mut is_null = false;
    for attribute in e.attributes() {
        let attribute =
            attribute.map_err(|e| WireError::malformed(format!("bad attribute: {e}")))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| WireError::malformed(format!("bad attribute value: {e}")))?;
        match attribute.key.local_name().as_ref() {
            b"type" => {
                tag = Some(EdmType::parse(&value).ok_or_else(|| {
                    WireError::malformed(format!("unknown property type tag: {value}"))
                })?);
            }
            b"null" => {
                is_null = value.eq_ignore_ascii_case("true") || value == "1";
            }
            _ => {}
        }
    }

    Ok(PendingProperty {
        name,
        tag,
        is_null,
        text: String::new(),
    })
}
