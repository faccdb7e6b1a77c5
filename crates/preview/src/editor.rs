//! The read-only digest editor.
//!
//! Opening a resource starts its scan immediately; binding a surface to the
//! document happens separately, and the digest is only pushed to the surface
//! once it reports `ready`.

use crate::ActiveResource;
use crate::error::{ErrorKind, Result};
use crate::workbench::{Command, Workbench};
use exn::ResultExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use vista_asset::{AssetDocument, DigestOutcome, Subscription, digest_asset};
use vista_bridge::message::{DIGEST, OPEN_AS_TEXT, READY, RENDER_IN_VIEWER, STATE, UPDATE_DEFAULT_OPEN_AS_TEXT};
use vista_bridge::{Bridge, DigestBody, EnabledBody, StateBody, Surface};
use vista_config::{Config, EditorConfig};
use vista_digest::Extensions;
use vista_storage::{AssetUri, AssociationStore, BackendHandle, pattern_for};

/// Host collaborators shared by every editor.
#[derive(Clone)]
pub struct Host {
    pub workbench: Arc<dyn Workbench>,
    pub associations: Arc<dyn AssociationStore>,
    pub active: ActiveResource,
}

/// The static part of the editor page, decided once when it is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub extension: String,
    /// Whether the resource can be reopened in a text editor at all
    pub is_text: bool,
    /// Whether the text editor is currently the default for the extension
    pub opens_as_text_by_default: bool,
}

type ScanHandle = JoinHandle<vista_asset::error::Result<DigestOutcome>>;

pub struct AssetEditor {
    doc: Arc<AssetDocument>,
    bridge: Arc<Bridge>,
    active: ActiveResource,
    view: EditorView,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

/// Serializes the digest posts of one editor.
///
/// A change that lands while a post is in flight, on another thread or from
/// inside the surface's own `post_message`, only marks the digest dirty; the
/// poster then sends a fresh snapshot before releasing the gate. The last
/// digest a surface receives is therefore never older than the document.
#[derive(Default)]
struct DigestPoster {
    gate: Mutex<()>,
    dirty: AtomicBool,
}

impl DigestPoster {
    fn post(&self, doc: &AssetDocument, bridge: &Bridge) {
        self.dirty.store(true, Ordering::Release);
        loop {
            let guard = match self.gate.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            while self.dirty.swap(false, Ordering::AcqRel) {
                post_digest(doc, bridge);
            }
            drop(guard);
            if !self.dirty.load(Ordering::Acquire) {
                return;
            }
        }
    }
}

impl AssetEditor {
    /// Open a document for `uri` and start scanning it on the current Tokio
    /// runtime.
    ///
    /// Fails with [`Runtime`](ErrorKind::Runtime) outside of a runtime.
    pub fn open_document(
        uri: AssetUri,
        backend: BackendHandle,
        extensions: Extensions,
    ) -> Result<(Arc<AssetDocument>, ScanHandle)> {
        let runtime = Handle::try_current().or_raise(|| ErrorKind::Runtime)?;
        let doc = AssetDocument::open(uri);
        let scan = runtime.spawn(digest_asset(Arc::clone(&doc), backend, extensions));
        Ok((doc, scan))
    }

    /// Bind an opened document to a surface.
    ///
    /// The new editor becomes the active resource. Nothing is posted until
    /// the surface reports `ready`; from then on, every digest change is
    /// forwarded as a full `digest` message.
    #[instrument(skip_all, fields(uri = %doc.uri()))]
    pub async fn resolve(doc: Arc<AssetDocument>, surface: Arc<dyn Surface>, host: Host, config: &Config) -> Self {
        let extension = doc.extension();
        let current = match host.associations.get(&pattern_for(&extension)).await {
            Ok(current) => current,
            Err(err) => {
                warn!(?err, "could not read editor associations, assuming the digest editor");
                None
            },
        };
        let view = EditorView {
            is_text: config.extensions.is_text(&extension),
            opens_as_text_by_default: current.is_some_and(|id| id == config.editor.default_id),
            extension,
        };

        host.active.set(doc.uri());
        let bridge = Arc::new(Bridge::new(surface));
        let subscription = Arc::new(Mutex::new(None));
        register_ready(&bridge, &doc, &subscription);
        register_commands(&bridge, doc.uri(), &host, &config.editor, &view.extension);

        Self {
            doc,
            bridge,
            active: host.active,
            view,
            subscription,
        }
    }

    pub fn document(&self) -> &Arc<AssetDocument> {
        &self.doc
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    /// The panel was shown, hidden, focused or blurred.
    ///
    /// A disposed editor never becomes the active resource again.
    pub fn set_view_state(&self, visible: bool, active: bool) -> Result<()> {
        if self.doc.is_disposed() {
            exn::bail!(ErrorKind::Bridge);
        }
        if visible && active {
            self.active.set(self.doc.uri());
        } else {
            self.active.clear_if(self.doc.uri());
        }
        self.bridge.post_json(STATE, &StateBody { active }).or_raise(|| ErrorKind::Bridge)
    }

    /// The panel was closed. Only one editor exists per document, so the
    /// document goes with it, abandoning any scan still in flight.
    pub fn dispose(&self) {
        self.active.clear_if(self.doc.uri());
        let subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner).take();
        drop(subscription);
        self.bridge.close();
        self.doc.dispose();
    }
}

/// Record whether `extension` should open in the text editor by default.
pub async fn set_open_as_text_by_default(
    associations: &dyn AssociationStore,
    editor: &EditorConfig,
    extension: &str,
    enabled: bool,
) -> Result<()> {
    let id = if enabled { &editor.default_id } else { &editor.id };
    associations
        .set(&pattern_for(extension), id)
        .await
        .or_raise(|| ErrorKind::Storage)
}

fn post_digest(doc: &AssetDocument, bridge: &Bridge) {
    let snapshot = doc.snapshot();
    let body = DigestBody {
        digest: snapshot.rows,
        finalized: snapshot.finalized,
    };
    if let Err(err) = bridge.post_json(DIGEST, &body) {
        warn!(?err, uri = %doc.uri(), "could not post digest");
    }
}

fn register_ready(bridge: &Arc<Bridge>, doc: &Arc<AssetDocument>, slot: &Arc<Mutex<Option<Subscription>>>) {
    let weak_doc = Arc::downgrade(doc);
    let weak_bridge = Arc::downgrade(bridge);
    let slot = Arc::clone(slot);
    let poster = Arc::new(DigestPoster::default());
    bridge.on(READY, move |_| {
        let (Some(doc), Some(bridge)) = (weak_doc.upgrade(), weak_bridge.upgrade()) else {
            return;
        };
        // Subscribe first: a change racing the snapshot is then posted twice
        // rather than not at all.
        let subscription = doc.on_change({
            let doc = Weak::clone(&weak_doc);
            let bridge = Weak::clone(&weak_bridge);
            let poster = Arc::clone(&poster);
            move || {
                if let (Some(doc), Some(bridge)) = (doc.upgrade(), bridge.upgrade()) {
                    poster.post(&doc, &bridge);
                }
            }
        });
        // A reloaded surface says ready again; the old subscription goes.
        let previous = slot.lock().unwrap_or_else(PoisonError::into_inner).replace(subscription);
        drop(previous);
        poster.post(&doc, &bridge);
    });
}

fn register_commands(bridge: &Bridge, uri: &AssetUri, host: &Host, editor: &EditorConfig, extension: &str) {
    let on_command = |kind: &str, command: Command| {
        let workbench = Arc::clone(&host.workbench);
        bridge.on(kind, move |_| {
            debug!(%command, "executing host command");
            if let Err(err) = workbench.execute(command.clone()) {
                warn!(?err, %command, "host command failed");
            }
        });
    };
    on_command(RENDER_IN_VIEWER, Command::RenderInViewer(uri.clone()));
    on_command(OPEN_AS_TEXT, Command::ReopenAsText(uri.clone()));

    let associations = Arc::clone(&host.associations);
    let editor = editor.clone();
    let extension = extension.to_string();
    bridge.on(UPDATE_DEFAULT_OPEN_AS_TEXT, move |body: Value| {
        let EnabledBody { enabled } = match serde_json::from_value::<EnabledBody>(body) {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, "malformed {UPDATE_DEFAULT_OPEN_AS_TEXT} message");
                return;
            },
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, editor association not updated");
            return;
        };
        let associations = Arc::clone(&associations);
        let editor = editor.clone();
        let extension = extension.clone();
        runtime.spawn(async move {
            if let Err(err) = set_open_as_text_by_default(associations.as_ref(), &editor, &extension, enabled).await {
                warn!(?err, %extension, "could not update editor association");
            }
        });
    });
}
