use crate::Surface;
use crate::error::{ErrorKind, Result};
use crate::message::{Message, READY, RESPONSE, ResponseBody, empty_body};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace};

type Handler = Arc<dyn Fn(Value) + Send + Sync>;

/// Readiness of the surface on the other end of a [`Bridge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeState {
    /// Messages can be posted, but the surface may not be listening yet.
    AwaitingReady,
    /// The surface announced itself with a `ready` message.
    Ready,
}

struct Registry {
    state: BridgeState,
    closed: bool,
    handlers: HashMap<String, Handler>,
    pending: HashMap<u64, oneshot::Sender<Value>>,
}

/// Two-way message channel between the host and one rendering surface.
///
/// Outbound messages go straight to the [`Surface`], which preserves their
/// order. Inbound messages are handed to [`receive`](Self::receive) by
/// whatever drives the surface, and dispatched to the single handler
/// registered for their type. A reloaded surface gets a new bridge.
pub struct Bridge {
    surface: Arc<dyn Surface>,
    registry: Mutex<Registry>,
    next_request: AtomicU64,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        f.debug_struct("Bridge")
            .field("state", &registry.state)
            .field("closed", &registry.closed)
            .field("pending", &registry.pending.len())
            .finish_non_exhaustive()
    }
}

impl Bridge {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            registry: Mutex::new(Registry {
                state: BridgeState::AwaitingReady,
                closed: false,
                handlers: HashMap::new(),
                pending: HashMap::new(),
            }),
            next_request: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn state(&self) -> BridgeState {
        self.lock().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == BridgeState::Ready
    }

    fn ensure_open(&self) -> Result<()> {
        if self.lock().closed {
            exn::bail!(ErrorKind::Closed);
        }
        Ok(())
    }

    /// Queue a message for the surface, in any state. A missing body is sent
    /// as `{}`.
    #[instrument(skip(self, body))]
    pub fn post(&self, kind: &str, body: Option<Value>) -> Result<()> {
        self.ensure_open()?;
        self.surface.post_message(Message::with_body(kind, body.unwrap_or_else(empty_body)))
    }

    /// [`post`](Self::post) with a typed body.
    pub fn post_json<T: Serialize + ?Sized>(&self, kind: &str, body: &T) -> Result<()> {
        let body = serde_json::to_value(body).or_raise(|| ErrorKind::Serialization)?;
        self.post(kind, Some(body))
    }

    /// Register the callback for a message type, replacing any previous one.
    ///
    /// Callbacks run synchronously inside [`receive`](Self::receive), outside
    /// the bridge's lock, so they are free to post.
    pub fn on(&self, kind: impl Into<String>, callback: impl Fn(Value) + Send + Sync + 'static) {
        let previous = {
            let mut registry = self.lock();
            if registry.closed {
                return;
            }
            registry.handlers.insert(kind.into(), Arc::new(callback))
        };
        drop(previous);
    }

    /// Dispatch one inbound message.
    ///
    /// `ready` flips the bridge to [`BridgeState::Ready`] before its handler
    /// runs. `response` settles the matching pending request. Types without
    /// a handler, unmatched responses and anything arriving after
    /// [`close`](Self::close) are dropped.
    #[instrument(skip_all, fields(kind = %message.kind))]
    pub fn receive(&self, message: Message) {
        let handler = {
            let mut registry = self.lock();
            if registry.closed {
                trace!("bridge closed, dropping inbound message");
                return;
            }
            if message.is(READY) && registry.state == BridgeState::AwaitingReady {
                debug!("surface is ready");
                registry.state = BridgeState::Ready;
            }
            if message.is(RESPONSE) {
                let Some((request_id, body)) = response_parts(message) else {
                    trace!("response without a request id, dropping");
                    return;
                };
                match registry.pending.remove(&request_id) {
                    // The requester may have given up waiting; nothing to do then.
                    Some(sender) => drop(sender.send(body)),
                    None => trace!(request_id, "no pending request, dropping response"),
                }
                return;
            }
            match registry.handlers.get(&message.kind) {
                Some(handler) => Arc::clone(handler),
                None => {
                    trace!("no handler registered, dropping message");
                    return;
                },
            }
        };
        handler(message.body);
    }

    /// Post a message carrying a fresh `requestId` and wait for the
    /// surface's `response` to it.
    ///
    /// The message is posted immediately; the returned future only waits.
    /// There is no timeout: a surface that never answers leaves the request
    /// pending until the bridge is closed, at which point it fails with
    /// [`Closed`](ErrorKind::Closed).
    pub fn post_with_response<R>(
        &self,
        kind: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<R>> + Send + use<R>
    where
        R: DeserializeOwned,
    {
        let receiver = self.request(kind, body);
        async move {
            let value = receiver?.await.or_raise(|| ErrorKind::Closed)?;
            serde_json::from_value(value).or_raise(|| ErrorKind::Serialization)
        }
    }

    fn request(&self, kind: &str, body: Option<Value>) -> Result<oneshot::Receiver<Value>> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        {
            let mut registry = self.lock();
            if registry.closed {
                exn::bail!(ErrorKind::Closed);
            }
            registry.pending.insert(request_id, sender);
        }
        let mut message = Message::with_body(kind, body.unwrap_or_else(empty_body));
        message.request_id = Some(request_id);
        if let Err(err) = self.surface.post_message(message) {
            self.lock().pending.remove(&request_id);
            return Err(err);
        }
        Ok(receiver)
    }

    /// Tear the bridge down: drop every handler and pending request. Later
    /// posts fail with [`Closed`](ErrorKind::Closed); later inbound messages
    /// are ignored. Idempotent.
    pub fn close(&self) {
        let (handlers, pending) = {
            let mut registry = self.lock();
            registry.closed = true;
            (std::mem::take(&mut registry.handlers), std::mem::take(&mut registry.pending))
        };
        if !pending.is_empty() {
            debug!(pending = pending.len(), "closing bridge with unanswered requests");
        }
        drop((handlers, pending));
    }
}

/// The request id and payload of a `response`, either nested in the body
/// (`{requestId, body}`) or, failing that, carried on the message itself.
fn response_parts(message: Message) -> Option<(u64, Value)> {
    match serde_json::from_value::<ResponseBody>(message.body.clone()) {
        Ok(response) => Some((response.request_id, response.body)),
        Err(_) => message.request_id.map(|id| (id, message.body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelSurface;
    use crate::message::{DigestBody, OPEN_AS_TEXT, RENDER_IN_VIEWER, STATE, UPDATE_DEFAULT_OPEN_AS_TEXT};
    use rstest::rstest;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc::UnboundedReceiver;
    use vista_digest::DigestRow;

    fn bridge() -> (Arc<Bridge>, UnboundedReceiver<Message>) {
        let (surface, receiver) = ChannelSurface::new();
        (Arc::new(Bridge::new(Arc::new(surface))), receiver)
    }

    fn drain(receiver: &mut UnboundedReceiver<Message>) -> Vec<Message> {
        std::iter::from_fn(|| receiver.try_recv().ok()).collect()
    }

    fn counter(bridge: &Bridge, kind: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        bridge.on(kind, {
            let count = Arc::clone(&count);
            move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        count
    }

    #[test]
    fn test_ready_handshake() {
        let (bridge, _receiver) = bridge();
        let ready = counter(&bridge, READY);
        assert_eq!(bridge.state(), BridgeState::AwaitingReady);

        bridge.receive(Message::new(READY));
        assert!(bridge.is_ready());
        assert_eq!(ready.load(Ordering::SeqCst), 1);

        // A second ready is dispatched but the state never regresses.
        bridge.receive(Message::new(READY));
        assert!(bridge.is_ready());
        assert_eq!(ready.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_ready_without_handler() {
        let (bridge, _receiver) = bridge();
        bridge.receive(Message::new(READY));
        assert!(bridge.is_ready());
    }

    #[test]
    fn test_ready_handler_sees_ready_state() {
        let (bridge, mut receiver) = bridge();
        bridge.on(READY, {
            let bridge = Arc::downgrade(&bridge);
            move |_| {
                if let Some(bridge) = bridge.upgrade() {
                    bridge.post_json(STATE, &json!({"active": bridge.is_ready()})).unwrap();
                }
            }
        });
        bridge.receive(Message::new(READY));
        let messages = drain(&mut receiver);
        assert_eq!(messages, vec![Message::with_body(STATE, json!({"active": true}))]);
    }

    #[test]
    fn test_post_preserves_order() {
        let (bridge, mut receiver) = bridge();
        bridge.post("first", None).unwrap();
        bridge.post("second", Some(json!({"n": 2}))).unwrap();
        let body = DigestBody {
            digest: vec![DigestRow::new("path", "/a")],
            finalized: true,
        };
        bridge.post_json("third", &body).unwrap();

        let messages = drain(&mut receiver);
        assert_eq!(
            messages,
            vec![
                Message::new("first"),
                Message::with_body("second", json!({"n": 2})),
                Message::with_body("third", json!({"digest": [["path", "/a"]], "final": true})),
            ]
        );
    }

    #[rstest]
    #[case(READY, true)]
    #[case(RENDER_IN_VIEWER, false)]
    #[case(OPEN_AS_TEXT, false)]
    #[case(UPDATE_DEFAULT_OPEN_AS_TEXT, false)]
    fn test_dispatch_by_type(#[case] kind: &str, #[case] becomes_ready: bool) {
        let (bridge, _receiver) = bridge();
        let kinds = [READY, RENDER_IN_VIEWER, OPEN_AS_TEXT, UPDATE_DEFAULT_OPEN_AS_TEXT];
        let counters: Vec<_> = kinds.iter().map(|k| counter(&bridge, k)).collect();

        bridge.receive(Message::new(kind));

        for (k, count) in kinds.iter().zip(&counters) {
            let expected = usize::from(*k == kind);
            assert_eq!(count.load(Ordering::SeqCst), expected, "handler for {k}");
        }
        assert_eq!(bridge.is_ready(), becomes_ready);
    }

    #[test]
    fn test_handler_replacement() {
        let (bridge, _receiver) = bridge();
        let first = counter(&bridge, "open-as-text");
        let second = counter(&bridge, "open-as-text");
        bridge.receive(Message::new("open-as-text"));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_type_is_dropped() {
        let (bridge, _receiver) = bridge();
        let known = counter(&bridge, "known");
        bridge.receive(Message::new("unknown"));
        assert_eq!(known.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_receives_body() {
        let (bridge, _receiver) = bridge();
        let seen = Arc::new(Mutex::new(None));
        bridge.on("update-default-open-as-text", {
            let seen = Arc::clone(&seen);
            move |body| *seen.lock().unwrap() = Some(body)
        });
        bridge.receive(Message::with_body("update-default-open-as-text", json!({"enabled": true})));
        assert_eq!(*seen.lock().unwrap(), Some(json!({"enabled": true})));
    }

    #[tokio::test]
    async fn test_post_with_response() {
        let (bridge, mut receiver) = bridge();
        let first = bridge.post_with_response::<Vec<u8>>("getFileData", None);
        let second = bridge.post_with_response::<String>("getName", Some(json!({"short": true})));

        let requests = drain(&mut receiver);
        assert_eq!(requests[0].request_id, Some(1));
        assert_eq!(requests[0].body, json!({}));
        assert_eq!(requests[1].request_id, Some(2));

        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 2, "body": "duck"})));
        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 1, "body": [1, 2, 3]})));

        assert_eq!(second.await.unwrap(), "duck");
        assert_eq!(first.await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unmatched_response_leaves_request_pending() {
        let (bridge, _receiver) = bridge();
        let mut pending = std::pin::pin!(bridge.post_with_response::<u32>("count", None));

        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 99, "body": 5})));
        assert!(futures::poll!(pending.as_mut()).is_pending());

        // Responding twice is harmless: the second one no longer matches.
        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 1, "body": 7})));
        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 1, "body": 8})));
        assert_eq!(pending.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_response_with_top_level_request_id() {
        let (bridge, _receiver) = bridge();
        let pending = bridge.post_with_response::<Value>("getFileData", None);
        let mut response = Message::with_body(RESPONSE, json!([1, 2]));
        response.request_id = Some(1);
        bridge.receive(response);
        assert_eq!(pending.await.unwrap(), json!([1, 2]));
    }

    #[tokio::test]
    async fn test_response_of_wrong_shape() {
        let (bridge, _receiver) = bridge();
        let pending = bridge.post_with_response::<u32>("count", None);
        bridge.receive(Message::with_body(RESPONSE, json!({"requestId": 1, "body": "many"})));
        let err = pending.await.unwrap_err();
        assert_eq!(*err, ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn test_close() {
        let (bridge, mut receiver) = bridge();
        let ready = counter(&bridge, READY);
        let pending = bridge.post_with_response::<u32>("count", None);
        drain(&mut receiver);

        bridge.close();
        bridge.close();

        assert_eq!(*pending.await.unwrap_err(), ErrorKind::Closed);
        assert_eq!(*bridge.post("digest", None).unwrap_err(), ErrorKind::Closed);
        assert_eq!(*bridge.post_with_response::<u32>("count", None).await.unwrap_err(), ErrorKind::Closed);
        bridge.receive(Message::new(READY));
        assert_eq!(ready.load(Ordering::SeqCst), 0);
        assert!(!bridge.is_ready());
        assert!(drain(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn test_surface_failure_releases_request() {
        let (bridge, receiver) = bridge();
        drop(receiver);
        let err = bridge.post_with_response::<u32>("count", None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Surface(_)));
        assert!(bridge.lock().pending.is_empty());
    }
}
