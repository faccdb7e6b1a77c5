use crate::Message;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tokio::sync::mpsc;
use vista_storage::AssetUri;

/// The rendering side of a bridge.
///
/// Implementations must deliver messages in the order they were posted.
pub trait Surface: Send + Sync {
    /// Queue a message for the surface.
    fn post_message(&self, message: Message) -> Result<()>;

    /// Translate a resource locator into one the surface can load.
    fn resource_uri(&self, uri: &AssetUri) -> String {
        uri.to_string()
    }
}

/// A surface backed by an unbounded channel; the receiving half stands in
/// for the rendering process.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    sender: mpsc::UnboundedSender<Message>,
}

impl ChannelSurface {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Surface for ChannelSurface {
    fn post_message(&self, message: Message) -> Result<()> {
        self.sender
            .send(message)
            .or_raise(|| ErrorKind::Surface("surface receiver has been dropped".to_string()))
    }
}
