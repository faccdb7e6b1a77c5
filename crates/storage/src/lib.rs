pub mod associations;
pub mod backend;
pub mod error;
mod models;
mod path;
mod uri;

pub use crate::associations::{AssociationStore, JsonAssociations, pattern_for};
pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
pub use crate::uri::AssetUri;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
