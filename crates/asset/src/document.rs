use crate::error::{ErrorKind, Result};
use crate::log::{DigestLog, DigestSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, instrument};
use vista_digest::DigestRow;
use vista_storage::AssetUri;

type Observer = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct State {
    log: DigestLog,
    disposed: bool,
    observers: Vec<(u64, Observer)>,
    next_observer: u64,
}

/// A read-only view of one asset resource and its accumulating digest.
///
/// Shared between the scan that fills it and the presentation that shows it,
/// so it is always handed out behind an [`Arc`]. Every transition (append,
/// dispose) happens in one short critical section: a disposed document can
/// never gain rows, no matter how the scan's awaits interleave with disposal.
pub struct AssetDocument {
    uri: AssetUri,
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for AssetDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDocument").field("uri", &self.uri).finish_non_exhaustive()
    }
}

impl AssetDocument {
    /// A fresh document with an empty, open digest.
    pub fn open(uri: AssetUri) -> Arc<Self> {
        Arc::new(Self {
            uri,
            state: Arc::default(),
        })
    }

    pub fn uri(&self) -> &AssetUri {
        &self.uri
    }

    /// Lower-cased extension of the resource path, with its leading dot.
    pub fn extension(&self) -> String {
        self.uri.extension()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Observers run outside the lock, so poisoning can only come from a
        // panic inside our own short critical sections; the state is still
        // consistent at that point.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append rows to the digest, optionally finalizing it, then notify every
    /// observer once.
    ///
    /// Fails with [`Disposed`](ErrorKind::Disposed) or
    /// [`AlreadyFinalized`](ErrorKind::AlreadyFinalized); a failed append
    /// leaves the digest untouched and notifies nobody.
    #[instrument(skip(self, rows), fields(uri = %self.uri, rows = rows.len()))]
    pub fn append_to_digest(&self, rows: Vec<DigestRow>, finalize: bool) -> Result<()> {
        let observers: Vec<Observer> = {
            let mut state = self.lock();
            if state.disposed {
                exn::bail!(ErrorKind::Disposed);
            }
            state.log.append(rows, finalize)?;
            state.observers.iter().map(|(_, observer)| Arc::clone(observer)).collect()
        };
        for observer in observers {
            observer();
        }
        Ok(())
    }

    /// A consistent copy of the rows and the finalized flag.
    ///
    /// Still readable after disposal.
    pub fn snapshot(&self) -> DigestSnapshot {
        self.lock().log.snapshot()
    }

    /// Register a callback fired after every successful append.
    ///
    /// The callback receives no payload; call [`snapshot`](Self::snapshot)
    /// to see the new state. Dropping the returned [`Subscription`] removes
    /// the callback.
    pub fn on_change(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut state = self.lock();
        let id = state.next_observer;
        state.next_observer += 1;
        if !state.disposed {
            state.observers.push((id, Arc::new(callback)));
        }
        Subscription {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Mark the document as disposed and drop every observer.
    ///
    /// Idempotent. Rows stay readable; finalization is unaffected.
    pub fn dispose(&self) {
        let observers = {
            let mut state = self.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            std::mem::take(&mut state.observers)
        };
        debug!(uri = %self.uri, "asset document disposed");
        // Observer closures may own resources; release them outside the lock.
        drop(observers);
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Fails with [`Disposed`](ErrorKind::Disposed) once the document has
    /// been disposed.
    pub fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            exn::bail!(ErrorKind::Disposed);
        }
        Ok(())
    }
}

/// Handle to a change callback registered with
/// [`AssetDocument::on_change`].
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    state: Weak<Mutex<State>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let removed = {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            let position = state.observers.iter().position(|(id, _)| *id == self.id);
            position.map(|index| state.observers.remove(index))
        };
        drop(removed);
    }
}
