//! CLI Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not access {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    #[display("could not digest {}", _0.display())]
    Digest(#[error(not(source))] PathBuf),
    #[display("editor association could not be read or updated")]
    Association,
    #[display("not a recognized asset extension: {_0}")]
    Unsupported(#[error(not(source))] String),
}
