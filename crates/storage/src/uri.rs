//! Resource locators.
//!
//! The host identifies every resource with a URI. Only two schemes matter to
//! this crate: `file` (backed by a [`StorageBackend`](crate::StorageBackend))
//! and `untitled` (an unsaved buffer with no backing storage). Any other
//! scheme is carried through untouched so that providers can still display it.

use crate::error::{Error, ErrorKind, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const FILE_SCHEME: &str = "file";
pub const UNTITLED_SCHEME: &str = "untitled";

/// A resource locator: a scheme plus a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetUri {
    scheme: String,
    path: PathBuf,
}

impl AssetUri {
    /// A `file` URI for the given path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: FILE_SCHEME.to_string(),
            path: path.into(),
        }
    }

    /// An `untitled` URI, as handed out by the host for unsaved buffers.
    pub fn untitled(name: impl Into<PathBuf>) -> Self {
        Self {
            scheme: UNTITLED_SCHEME.to_string(),
            path: name.into(),
        }
    }

    /// Parse a locator string.
    ///
    /// Accepts `file:///abs/path`, `scheme:path`, or a bare filesystem path
    /// (treated as `file`). Single-letter schemes are assumed to be Windows
    /// drive letters and also treated as bare paths.
    ///
    /// ```
    /// use vista_storage::AssetUri;
    /// let uri = AssetUri::parse("file:///models/duck.glb").unwrap();
    /// assert_eq!(uri.scheme(), "file");
    /// assert_eq!(uri.path(), std::path::Path::new("/models/duck.glb"));
    /// assert!(AssetUri::parse("untitled:Untitled-1").unwrap().is_untitled());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            exn::bail!(ErrorKind::InvalidUri(value.to_string()));
        }
        if let Some(rest) = value.strip_prefix("file://") {
            if rest.is_empty() {
                exn::bail!(ErrorKind::InvalidUri(value.to_string()));
            }
            return Ok(Self::file(rest));
        }
        match value.split_once(':') {
            Some((scheme, rest)) if scheme.len() > 1 && is_scheme(scheme) => {
                if rest.is_empty() {
                    exn::bail!(ErrorKind::InvalidUri(value.to_string()));
                }
                Ok(Self {
                    scheme: scheme.to_lowercase(),
                    path: PathBuf::from(rest),
                })
            },
            _ => Ok(Self::file(value)),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_file(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    pub fn is_untitled(&self) -> bool {
        self.scheme == UNTITLED_SCHEME
    }

    /// Lower-cased extension including the leading dot (`.gltf`), or an
    /// empty string when the path has none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default()
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for AssetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.is_file() && self.path.is_absolute() {
            true => write!(f, "file://{}", self.path.display()),
            false => write!(f, "{}:{}", self.scheme, self.path.display()),
        }
    }
}

impl FromStr for AssetUri {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
