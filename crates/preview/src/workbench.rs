use crate::error::Result;
use std::fmt;
use vista_storage::AssetUri;

/// A host command triggered from a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the resource in the side-panel viewer.
    RenderInViewer(AssetUri),
    /// Replace the digest editor for the resource with a text editor.
    ReopenAsText(AssetUri),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::RenderInViewer(uri) => write!(f, "render {uri} in viewer"),
            Command::ReopenAsText(uri) => write!(f, "reopen {uri} as text"),
        }
    }
}

/// The host IDE's command surface.
///
/// Calls are made from inside message handlers and must not block.
pub trait Workbench: Send + Sync {
    fn execute(&self, command: Command) -> Result<()>;

    /// Bring the viewer panel into view.
    fn reveal_viewer(&self) -> Result<()>;
}
