mod classify;
pub mod error;
mod format;
mod formats;
mod friendly;
mod row;

use tracing::instrument;

use crate::error::Result;
pub use crate::classify::{Extensions, FileClass};
pub use crate::format::Format;
pub use crate::friendly::{ZWS, friendly_size, friendly_timestamp, friendly_timestamp_in, wrappable_path};
pub use crate::row::DigestRow;

/// Easy, top-level entrypoint for summarizing the raw bytes of an asset.
///
/// Pure: the returned rows are only data, and the caller decides where they
/// go. A parse failure is reported as an error and no rows are produced.
///
/// ```rust
/// use vista_digest::{Format, digest};
/// let rows = digest(Format::Babylon, br#"{"meshes": [{"name": "box"}, {"id": "sphere"}, {}]}"#).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].label, "meshes");
/// assert_eq!(rows[0].value, "[3] box, sphere");
/// ```
#[instrument(skip(content), fields(content_size = content.as_ref().len()))]
pub fn digest(format: Format, content: impl AsRef<[u8]>) -> Result<Vec<DigestRow>> {
    let content = content.as_ref();
    match format {
        Format::Babylon => formats::babylon::digest(content),
        Format::Gltf => formats::gltf::digest(content),
        Format::Glb => formats::glb::digest(content),
        Format::Obj => formats::obj::digest(content),
    }
}
