//! Storage models.

use std::path::PathBuf;
use time::OffsetDateTime;

/// Resource metadata returned by storage backends.
///
/// This is the "stat" half of the host's filesystem contract: enough to
/// describe a resource without reading its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path of the resource, as given to the backend
    pub path: PathBuf,
    /// Resource size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        Self {
            path: path.into(),
            size,
            modified: modified.into(),
        }
    }
}
