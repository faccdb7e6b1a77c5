use super::{first_named, parse_object, summarize};
use crate::DigestRow;
use crate::error::Result;
use serde_json::Value;
use tracing::instrument;

const COLLECTIONS: [&str; 7] = ["cameras", "lights", "materials", "meshes", "particleSystems", "actions", "sounds"];

fn name_of(element: &Value) -> Option<String> {
    first_named(element, &["name", "id", "emitterId"])
}

/// Summarize a Babylon.js scene description.
#[instrument(skip_all)]
pub(crate) fn digest(content: &[u8]) -> Result<Vec<DigestRow>> {
    let scene = parse_object(content)?;
    Ok(COLLECTIONS
        .iter()
        .filter_map(|&label| summarize(label, scene.get(label), name_of))
        .collect())
}
