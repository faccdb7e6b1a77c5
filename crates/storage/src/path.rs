//! Path validation for backend-relative resource paths.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a resource path and normalizes it relative to a backend root.
///
/// Root and current-directory components are dropped, and `..` is resolved
/// lexically. A path that would climb above the root, contains a null byte,
/// carries a Windows prefix, or normalizes to nothing is rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vista_storage::validate_path;
/// assert!(validate_path("models/duck.gltf").is_ok());
/// assert!(validate_path("scenes/../duck.glb").is_ok());
/// assert!(validate_path("../outside.obj").is_err());
/// assert!(validate_path("a\0b.obj").is_err());
/// assert_eq!(
///     validate_path("/assets/./scenes/../duck.babylon").unwrap(),
///     Path::new("assets/duck.babylon")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}
