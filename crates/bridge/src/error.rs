//! Bridge Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A bridge error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bridge was torn down; create a new one for a reloaded surface.
    #[display("bridge is closed")]
    Closed,
    /// The surface refused or could not deliver a message.
    #[display("surface rejected message: {_0}")]
    Surface(#[error(not(source))] String),
    /// A message body could not be converted to or from JSON.
    #[display("message body could not be (de)serialized")]
    Serialization,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Surface(_))
    }
}
