//! Read-only storage backend.
//!
//! Wraps another backend, reports it as non-writable, and drops all write
//! operations while still indicating success.

use async_trait::async_trait;
use std::path::Path;

use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event). Assets served through it are presented to
/// surfaces as non-editable.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_writable(&self) -> bool {
        false
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(backend = self.name(), path = %path.display(), bytes = data.len(), "Skipping write to read-only backend");
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }
}
