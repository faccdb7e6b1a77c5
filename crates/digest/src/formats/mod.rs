//! Format-specific digesters.
//!
//! Every digester is a pure function from raw bytes to rows. Collections are
//! summarized with [`summarize`] so that the naming rules stay identical
//! across formats.

pub(crate) mod babylon;
pub(crate) mod glb;
pub(crate) mod gltf;
pub(crate) mod obj;

use crate::DigestRow;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Map, Value};

/// Parse a JSON document whose root must be an object.
pub(crate) fn parse_object(content: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(content).or_raise(|| ErrorKind::MalformedJson)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => exn::bail!(ErrorKind::InvalidDocument("expected a JSON object at the root")),
    }
}

/// The first of `fields` holding a non-empty string (or a number), rendered
/// as text.
pub(crate) fn first_named(element: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match element.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// One row per collection, only when at least one element is nameable.
///
/// The count covers every element, including the ones that could not be
/// named and are therefore left out of the listing.
pub(crate) fn summarize<F>(label: &str, collection: Option<&Value>, name_of: F) -> Option<DigestRow>
where
    F: Fn(&Value) -> Option<String>,
{
    let elements = collection?.as_array()?;
    let names: Vec<String> = elements.iter().filter_map(&name_of).collect();
    summary_row(label, elements.len(), &names)
}

/// `"[count] name1, name2"`, or nothing when no element has a name.
pub(crate) fn summary_row(label: &str, count: usize, names: &[String]) -> Option<DigestRow> {
    if names.is_empty() {
        return None;
    }
    Some(DigestRow::new(label, format!("[{count}] {}", names.join(", "))))
}
