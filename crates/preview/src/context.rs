use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vista_storage::AssetUri;

/// The resource shown by the focused digest editor, if any.
///
/// Cloning shares the same slot, so every provider holding a clone sees the
/// same value.
#[derive(Debug, Clone, Default)]
pub struct ActiveResource {
    slot: Arc<Mutex<Option<AssetUri>>>,
}

impl ActiveResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AssetUri>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Option<AssetUri> {
        self.lock().clone()
    }

    /// Mark `uri` as the active resource, replacing any other.
    pub fn set(&self, uri: &AssetUri) {
        *self.lock() = Some(uri.clone());
    }

    /// Clear the active resource, but only if it is still `uri`; another
    /// editor may have taken focus in the meantime.
    pub fn clear_if(&self, uri: &AssetUri) {
        let mut slot = self.lock();
        if slot.as_ref() == Some(uri) {
            *slot = None;
        }
    }
}
