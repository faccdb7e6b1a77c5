use super::{first_named, parse_object, summarize};
use crate::DigestRow;
use crate::error::Result;
use serde_json::{Map, Value};
use tracing::instrument;

const COLLECTIONS: [&str; 9] = [
    "scenes",
    "nodes",
    "meshes",
    "materials",
    "textures",
    "images",
    "animations",
    "cameras",
    "skins",
];

fn name_of(element: &Value) -> Option<String> {
    first_named(element, &["name"]).or_else(|| {
        // Embedded buffers would flood the table.
        first_named(element, &["uri"]).filter(|uri| !uri.starts_with("data:"))
    })
}

/// Summarize a glTF JSON document.
#[instrument(skip_all)]
pub(crate) fn digest(content: &[u8]) -> Result<Vec<DigestRow>> {
    let document = parse_object(content)?;
    Ok(rows(&document))
}

pub(super) fn rows(document: &Map<String, Value>) -> Vec<DigestRow> {
    let asset = document.get("asset");
    let property = |key: &str| asset.and_then(|a| a.get(key)).and_then(Value::as_str).filter(|s| !s.is_empty());
    let mut rows = Vec::new();
    if let Some(version) = property("version") {
        rows.push(DigestRow::new("version", version));
    }
    if let Some(generator) = property("generator") {
        rows.push(DigestRow::new("generator", generator));
    }
    rows.extend(
        COLLECTIONS
            .iter()
            .filter_map(|&label| summarize(label, document.get(label), name_of)),
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_asset_and_collections() {
        let content = br#"{
            "asset": {"version": "2.0", "generator": "Khronos glTF Blender I/O"},
            "scenes": [{"name": "Scene"}],
            "nodes": [{"name": "Duck"}, {"mesh": 0}],
            "meshes": [{}],
            "images": [{"uri": "DuckCM.png"}, {"uri": "data:image/png;base64,AAAA"}]
        }"#;
        let rows = digest(content).unwrap();
        assert_eq!(
            rows,
            vec![
                DigestRow::new("version", "2.0"),
                DigestRow::new("generator", "Khronos glTF Blender I/O"),
                DigestRow::new("scenes", "[1] Scene"),
                DigestRow::new("nodes", "[2] Duck"),
                DigestRow::new("images", "[2] DuckCM.png"),
            ]
        );
    }

    #[test]
    fn test_missing_asset_block() {
        let rows = digest(br#"{"materials": [{"name": "Wood"}]}"#).unwrap();
        assert_eq!(rows, vec![DigestRow::new("materials", "[1] Wood")]);
    }

    #[test]
    fn test_truncated_json() {
        assert_eq!(*digest(br#"{"asset": {"version": "2.0""#).unwrap_err(), ErrorKind::MalformedJson);
    }
}
