//! Presentation providers.
//!
//! [`AssetEditor`] binds one asset document to a digest surface;
//! [`AssetViewer`] drives the single side-panel renderer. Both talk to the
//! host through the [`Workbench`] trait and share an [`ActiveResource`].

mod context;
mod editor;
pub mod error;
#[cfg(test)]
mod testing;
mod viewer;
mod workbench;

pub use crate::context::ActiveResource;
pub use crate::editor::{AssetEditor, EditorView, Host, set_open_as_text_by_default};
pub use crate::viewer::AssetViewer;
pub use crate::workbench::{Command, Workbench};
