//! Persisted "file pattern → preferred editor" associations.
//!
//! The host keeps a user-editable map from glob-ish patterns (`*.gltf`) to
//! the id of the editor that should open matching resources by default. The
//! asset digest editor reads it to decide whether "open as text" is the
//! current default, and updates it when the user toggles that preference.

use crate::BackendHandle;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// The association pattern for an extension (`.gltf` becomes `*.gltf`).
pub fn pattern_for(extension: &str) -> String {
    format!("*{extension}")
}

/// Read/update access to the persisted association map.
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// The editor id associated with `pattern`, if any.
    async fn get(&self, pattern: &str) -> Result<Option<String>>;

    /// Associate `pattern` with `editor_id`, replacing any previous value.
    async fn set(&self, pattern: &str, editor_id: &str) -> Result<()>;
}

/// Associations stored as a JSON object in a single resource.
///
/// A missing resource reads as an empty map. Updates are read-modify-write
/// and serialized through an internal lock so that two concurrent updates
/// from the same process cannot lose each other's entries.
pub struct JsonAssociations {
    backend: BackendHandle,
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonAssociations {
    pub fn new(backend: BackendHandle, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.backend.exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }
        let bytes = self.backend.read(&self.path).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Serialization(self.path.clone()))
    }
}

#[async_trait]
impl AssociationStore for JsonAssociations {
    async fn get(&self, pattern: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(pattern))
    }

    async fn set(&self, pattern: &str, editor_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut associations = self.load().await?;
        associations.insert(pattern.to_string(), editor_id.to_string());
        let bytes =
            serde_json::to_vec_pretty(&associations).or_raise(|| ErrorKind::Serialization(self.path.clone()))?;
        self.backend.write(&self.path, &bytes).await?;
        tracing::debug!(pattern, editor_id, path = %self.path.display(), "Updated editor association");
        Ok(())
    }
}
