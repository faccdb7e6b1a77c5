//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait: the narrow slice of the
//! host's filesystem API that digesting and previewing need (stat, read,
//! existence, writability), plus a plain `write` used to persist editor
//! associations.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for resource access.
///
/// All operations are asynchronous: each one is a suspension point for the
/// caller, and a document may be disposed while one is in flight.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vista_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_scene(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = Path::new("scenes/level1.babylon");
///     if backend.exists(path).await? {
///         Ok(backend.stat(path).await?.size)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Whether resources in this backend can be modified by the user.
    ///
    /// Surfaces use this to decide if an asset is presented as editable.
    fn is_writable(&self) -> bool {
        true
    }

    /// Check if a resource exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read the complete resource contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the
    /// resource does not exist.
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use vista_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let data = backend.read(Path::new("models/duck.glb")).await?;
    /// println!("Read {} bytes", data.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create or overwrite a resource.
    ///
    /// Implementations should create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Get resource metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the
    /// resource does not exist.
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use vista_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let info = backend.stat(Path::new("models/duck.glb")).await?;
    /// println!("Size: {} bytes, modified: {}", info.size, info.modified);
    /// # Ok(())
    /// # }
    /// ```
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
