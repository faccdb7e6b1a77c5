//! The side-panel viewer: renders whichever asset it was last asked to open.

use crate::error::{ErrorKind, Result};
use crate::workbench::Workbench;
use exn::ResultExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use vista_bridge::message::{INIT, READY};
use vista_bridge::{Bridge, InitBody, Surface};
use vista_digest::Extensions;
use vista_storage::{AssetUri, BackendHandle};

pub struct AssetViewer {
    bridge: Arc<Bridge>,
    asset: Arc<Mutex<Option<AssetUri>>>,
    backend: BackendHandle,
    workbench: Arc<dyn Workbench>,
}

fn lock(asset: &Mutex<Option<AssetUri>>) -> MutexGuard<'_, Option<AssetUri>> {
    asset.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `{uri, editable}` for a real resource, `{}` when there is nothing the
/// surface could load.
fn post_init(bridge: &Bridge, asset: Option<&AssetUri>, backend: &BackendHandle) -> vista_bridge::error::Result<()> {
    let body = match asset {
        Some(uri) if !uri.is_untitled() => InitBody {
            uri: Some(bridge.surface().resource_uri(uri)),
            editable: Some(uri.is_file() && backend.is_writable()),
        },
        _ => InitBody::default(),
    };
    debug!(uri = ?body.uri, "posting viewer init");
    bridge.post_json(INIT, &body)
}

impl AssetViewer {
    /// Bind the viewer to its surface. The current asset (if any) is sent
    /// every time the surface reports `ready`.
    pub fn resolve(surface: Arc<dyn Surface>, backend: BackendHandle, workbench: Arc<dyn Workbench>) -> Self {
        let bridge = Arc::new(Bridge::new(surface));
        let asset: Arc<Mutex<Option<AssetUri>>> = Arc::default();
        bridge.on(READY, {
            let bridge = Arc::downgrade(&bridge);
            let asset = Arc::clone(&asset);
            let backend = Arc::clone(&backend);
            move |_| {
                let Some(bridge) = bridge.upgrade() else {
                    return;
                };
                let current = lock(&asset).clone();
                if let Err(err) = post_init(&bridge, current.as_ref(), &backend) {
                    warn!(?err, "could not initialize viewer");
                }
            }
        });
        Self {
            bridge,
            asset,
            backend,
            workbench,
        }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// The asset currently shown.
    pub fn current(&self) -> Option<AssetUri> {
        lock(&self.asset).clone()
    }

    pub fn show(&self) -> Result<()> {
        self.workbench.reveal_viewer()
    }

    /// Show `uri` in the viewer and bring it into view.
    ///
    /// The surface is only re-initialized when the asset actually changes
    /// and the surface is ready; otherwise the `ready` handshake picks it up.
    pub fn open(&self, uri: AssetUri) -> Result<()> {
        let changed = {
            let mut asset = lock(&self.asset);
            let changed = asset.as_ref() != Some(&uri);
            if changed {
                *asset = Some(uri.clone());
            }
            changed
        };
        if changed && self.bridge.is_ready() {
            post_init(&self.bridge, Some(&uri), &self.backend).or_raise(|| ErrorKind::Bridge)?;
        }
        self.show()
    }

    /// [`open`](Self::open) `uri` only if its extension is one the viewer
    /// can render. Returns whether it was opened.
    pub fn open_if_supported(&self, uri: AssetUri, extensions: &Extensions) -> Result<bool> {
        if !extensions.is_recognized(&uri.extension()) {
            debug!(%uri, "not a renderable asset, ignoring");
            return Ok(false);
        }
        self.open(uri)?;
        Ok(true)
    }

    pub fn dispose(&self) {
        self.bridge.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingWorkbench;
    use rstest::rstest;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;
    use vista_bridge::{ChannelSurface, Message};
    use vista_storage::backend::{MockBackend, ReadOnlyBackend};

    fn viewer(backend: MockBackend) -> (AssetViewer, UnboundedReceiver<Message>, Arc<RecordingWorkbench>) {
        let (surface, inbox) = ChannelSurface::new();
        let workbench = Arc::new(RecordingWorkbench::default());
        let viewer = AssetViewer::resolve(Arc::new(surface), Arc::new(backend), workbench.clone());
        (viewer, inbox, workbench)
    }

    fn inits(inbox: &mut UnboundedReceiver<Message>) -> Vec<serde_json::Value> {
        std::iter::from_fn(|| inbox.try_recv().ok())
            .filter(|message| message.is(INIT))
            .map(|message| message.body)
            .collect()
    }

    #[test]
    fn test_init_on_ready_without_asset() {
        let (viewer, mut inbox, _) = viewer(MockBackend::default());
        viewer.bridge().receive(Message::new(READY));
        assert_eq!(inits(&mut inbox), vec![json!({})]);
    }

    #[test]
    fn test_open_before_ready_waits_for_handshake() {
        let (viewer, mut inbox, workbench) = viewer(MockBackend::default());
        viewer.open(AssetUri::file("/models/duck.glb")).unwrap();
        assert!(inits(&mut inbox).is_empty());
        assert_eq!(workbench.reveals(), 1);

        viewer.bridge().receive(Message::new(READY));
        assert_eq!(
            inits(&mut inbox),
            vec![json!({"uri": "file:///models/duck.glb", "editable": true})]
        );
    }

    #[test]
    fn test_reinit_only_when_asset_changes() {
        let (viewer, mut inbox, workbench) = viewer(MockBackend::default().read_only());
        viewer.bridge().receive(Message::new(READY));
        inits(&mut inbox);

        viewer.open(AssetUri::file("/models/duck.glb")).unwrap();
        viewer.open(AssetUri::file("/models/duck.glb")).unwrap();
        viewer.open(AssetUri::file("/models/scene.babylon")).unwrap();

        assert_eq!(
            inits(&mut inbox),
            vec![
                json!({"uri": "file:///models/duck.glb", "editable": false}),
                json!({"uri": "file:///models/scene.babylon", "editable": false}),
            ]
        );
        // Every open still reveals the panel.
        assert_eq!(workbench.reveals(), 3);
        assert_eq!(viewer.current(), Some(AssetUri::file("/models/scene.babylon")));
    }

    #[rstest]
    #[case::writable(Arc::new(MockBackend::default()), true)]
    #[case::read_only(Arc::new(ReadOnlyBackend::new(Arc::new(MockBackend::default()))), false)]
    fn test_editable_follows_backend(#[case] backend: BackendHandle, #[case] editable: bool) {
        let (surface, mut inbox) = ChannelSurface::new();
        let viewer = AssetViewer::resolve(Arc::new(surface), backend, Arc::new(RecordingWorkbench::default()));
        viewer.open(AssetUri::file("/models/duck.glb")).unwrap();
        viewer.bridge().receive(Message::new(READY));
        assert_eq!(
            inits(&mut inbox),
            vec![json!({"uri": "file:///models/duck.glb", "editable": editable})]
        );
    }

    #[test]
    fn test_untitled_asset() {
        let (viewer, mut inbox, _) = viewer(MockBackend::default());
        viewer.bridge().receive(Message::new(READY));
        viewer.open(AssetUri::untitled("Untitled-1")).unwrap();
        assert_eq!(inits(&mut inbox), vec![json!({}), json!({})]);
    }

    #[test]
    fn test_reload_reposts_current_asset() {
        let (viewer, mut inbox, _) = viewer(MockBackend::default());
        viewer.open(AssetUri::file("/models/duck.glb")).unwrap();
        viewer.bridge().receive(Message::new(READY));
        viewer.bridge().receive(Message::new(READY));
        assert_eq!(inits(&mut inbox).len(), 2);
    }

    #[test]
    fn test_open_if_supported() {
        let (viewer, _inbox, workbench) = viewer(MockBackend::default());
        let extensions = Extensions::default();
        assert!(!viewer.open_if_supported(AssetUri::file("/models/duck.fbx"), &extensions).unwrap());
        assert_eq!(viewer.current(), None);
        assert!(viewer.open_if_supported(AssetUri::file("/models/duck.GLB"), &extensions).unwrap());
        assert_eq!(workbench.reveals(), 1);
    }

    #[test]
    fn test_dispose() {
        let (viewer, mut inbox, _) = viewer(MockBackend::default());
        viewer.dispose();
        viewer.bridge().receive(Message::new(READY));
        assert!(inits(&mut inbox).is_empty());
        assert!(!viewer.bridge().is_ready());
    }
}
