//! Digest Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A digest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The content is not valid JSON.
    #[display("malformed JSON")]
    MalformedJson,
    /// The JSON is valid but is not a document of the expected shape.
    #[display("invalid document: {_0}")]
    InvalidDocument(#[error(not(source))] &'static str),
    /// A binary container's header or chunk layout is broken.
    #[display("invalid container: {_0}")]
    InvalidContainer(#[error(not(source))] &'static str),
    /// Text content contains bytes that cannot appear in a text asset.
    #[display("invalid text content")]
    InvalidText,
    /// No digester exists for the requested format.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Content is either parseable or it isn't.
        false
    }
}
