//! Layered configuration.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults.
//! 2. A configuration file (`.toml`, `.yaml`/`.yml` or `.json`), either given
//!    explicitly or `vista.toml` in the platform configuration directory.
//! 3. Environment variables prefixed with `VISTA_`, using `__` to reach
//!    nested keys (`VISTA_LOG__LEVEL=debug`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
pub use vista_digest::Extensions;

pub const ENV_PREFIX: &str = "VISTA_";
pub const DEFAULT_FILE_NAME: &str = "vista.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Identifier of the digest editor, as stored in editor associations
    pub id: String,
    /// Identifier meaning "the host's plain text editor"
    pub default_id: String,
}
impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id: "vista.assetDigest".to_string(),
            default_id: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub id: String,
}
impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            id: "vista.assetViewer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationsConfig {
    /// Where the extension to editor mapping is persisted, relative to the
    /// workspace unless absolute
    pub file: PathBuf,
}
impl Default for AssociationsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".vista/associations.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// A `tracing` filter directive, overridden by `RUST_LOG`
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extensions: Extensions,
    pub editor: EditorConfig,
    pub viewer: ViewerConfig,
    pub associations: AssociationsConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load and validate configuration from every source.
    ///
    /// An explicit `file` must exist; without one, the platform default file
    /// is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("configuration file {} does not exist", path.display())))
            },
            Some(path) => Some(path.to_path_buf()),
            None => default_file(),
        };
        Self::from_figment(Self::figment(file.as_deref())?)
    }

    /// The merged provider stack, without extraction or validation.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            debug!(path = %path.display(), "loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Invalid(format!(
                    "unsupported configuration file type: {}",
                    path.display()
                ))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let extensions = &self.extensions;
        if let Some(bad) = extensions.all().find(|ext| !ext.starts_with('.') || ext.len() < 2) {
            exn::bail!(ErrorKind::Invalid(format!("extension {bad:?} must start with a dot")));
        }
        if let Some(both) = extensions.text.iter().find(|ext| extensions.binary.contains(ext)) {
            exn::bail!(ErrorKind::Invalid(format!("extension {both:?} is both text and binary")));
        }
        if self.editor.id.is_empty() || self.editor.default_id.is_empty() {
            exn::bail!(ErrorKind::Invalid("editor identifiers must not be empty".to_string()));
        }
        if self.editor.id == self.editor.default_id {
            exn::bail!(ErrorKind::Invalid("editor.id and editor.default_id must differ".to_string()));
        }
        Ok(())
    }
}

/// `vista.toml` in the platform configuration directory, if it exists.
pub fn default_file() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "vista")?;
    let path = dirs.config_dir().join(DEFAULT_FILE_NAME);
    path.is_file().then_some(path)
}
