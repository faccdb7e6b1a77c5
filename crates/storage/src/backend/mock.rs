//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::models::FileInfo;
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Resources are stored in a `HashMap` behind a [`RwLock`], keyed by their
/// validated path, so absolute and relative spellings of the same path hit
/// the same entry.
///
/// # Examples
///
/// ```ignore
/// use vista_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("/models/duck.obj", "v 0 0 0\n")]);
/// assert!(backend.exists(Path::new("/models/duck.obj")).await?);
/// assert_eq!(backend.stat(Path::new("models/duck.obj")).await?.size, 8);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    writable: bool,
    modified: OffsetDateTime,
    storage: RwLock<HashMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with resources.
    ///
    /// Panics if any path fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
        }
        Self {
            name: "mock".to_string(),
            writable: true,
            modified: now,
            storage: RwLock::new(map),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Report the backend as read-only (writes still succeed, like the
    /// in-memory store they are).
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Pin the modification time of every pre-populated resource.
    pub fn with_modified(mut self, modified: OffsetDateTime) -> Self {
        self.modified = modified;
        for (inserted, _) in self.storage.get_mut().values_mut() {
            *inserted = modified;
        }
        self
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let key = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&key))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let key = validate_path(path)?;
        let (_modified, data) = self
            .storage
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.to_path_buf())))?;
        Ok(data)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let key = validate_path(path)?;
        self.storage.write().await.insert(key, (self.modified, data.to_vec()));
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let key = validate_path(path)?;
        let guard = self.storage.read().await;
        let (modified, data) =
            guard.get(&key).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.to_path_buf())))?;
        Ok(FileInfo::new(path, data.len() as u64, *modified))
    }
}
