mod document;
pub mod error;
mod log;
pub mod scan;

pub use crate::document::{AssetDocument, Subscription};
pub use crate::log::DigestSnapshot;
pub use crate::scan::{DigestEvent, DigestOutcome, DigestStep, digest_asset, digest_stream};
