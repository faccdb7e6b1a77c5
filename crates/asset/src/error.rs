//! Asset Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// An asset error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document was disposed; stop working on it.
    #[display("asset document has been disposed")]
    Disposed,
    /// The digest is complete and accepts no further rows.
    #[display("digest has already been finalized")]
    AlreadyFinalized,
    /// Reading the resource failed.
    #[display("could not access the asset resource")]
    Storage,
    /// The resource content could not be digested.
    #[display("could not digest the asset content")]
    Digest,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Storage failures may be transient; the underlying storage error in
        // the tree has the final say.
        matches!(self, Self::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Disposed.to_string(), "asset document has been disposed");
        assert_eq!(ErrorKind::AlreadyFinalized.to_string(), "digest has already been finalized");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Storage.is_retryable());
        assert!(!ErrorKind::Disposed.is_retryable());
        assert!(!ErrorKind::Digest.is_retryable());
    }
}
