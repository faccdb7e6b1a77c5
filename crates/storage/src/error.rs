//! Storage Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Resource does not exist
    #[display("resource not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied by the host filesystem
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path contains invalid characters or escapes the backend root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Resource locator could not be parsed
    #[display("invalid resource locator: {_0}")]
    InvalidUri(#[error(not(source))] String),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
    /// Persisted data could not be encoded or decoded
    #[display("malformed persisted data: {}", _0.display())]
    Serialization(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("models/duck.glb")).to_string(),
            "resource not found: models/duck.glb"
        );
        assert_eq!(ErrorKind::InvalidUri(String::new()).to_string(), "invalid resource locator: ");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io(IoError::other("flaky disk")).is_retryable());
        assert!(!ErrorKind::NotFound(PathBuf::from("a.obj")).is_retryable());
        assert!(!ErrorKind::Serialization(PathBuf::from("associations.json")).is_retryable());
    }
}
