//! Preview Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A preview error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for preview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The surface could not be reached.
    #[display("could not communicate with the surface")]
    Bridge,
    /// Editor associations could not be read or written.
    #[display("could not access editor associations")]
    Storage,
    /// No async runtime is available to run background work on.
    #[display("no async runtime available")]
    Runtime,
    /// The host refused a command.
    #[display("host command failed: {_0}")]
    Workbench(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Bridge.to_string(), "could not communicate with the surface");
        assert_eq!(
            ErrorKind::Workbench("no viewer".to_string()).to_string(),
            "host command failed: no viewer"
        );
        assert!(ErrorKind::Storage.is_retryable());
        assert!(!ErrorKind::Bridge.is_retryable());
    }
}
