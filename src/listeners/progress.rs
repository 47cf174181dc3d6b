//! Progress listener registry with snapshot-on-dispatch fan-out

use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{ListenerId, invoke_guarded};
use crate::types::Document;

/// Receives a callback every time a page of the active document is fetched
///
/// Called on the worker task. Implementations that touch UI state must hand
/// the update over to their own thread.
pub trait ProgressListener: Send + Sync {
    /// The document's download cursor advanced
    fn on_progress(&self, document: &Document);
}

impl<F> ProgressListener for F
where
    F: Fn(&Document) + Send + Sync,
{
    fn on_progress(&self, document: &Document) {
        self(document)
    }
}

/// Registry of progress listeners
///
/// Listeners are kept in registration order. Dispatch copies the current set
/// out under a read lock and invokes them after releasing it, so listeners may
/// register or unregister (even themselves) from inside a callback.
#[derive(Default)]
pub struct ProgressBroadcaster {
    listeners: RwLock<IndexMap<ListenerId, Arc<dyn ProgressListener>>>,
}

impl ProgressBroadcaster {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener, returning the handle used to remove it
    pub fn register(&self, listener: Arc<dyn ProgressListener>) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id)
            .is_some()
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered listener, in registration order
    pub fn dispatch_progress(&self, document: &Document) {
        let snapshot: Vec<(ListenerId, Arc<dyn ProgressListener>)> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            invoke_guarded(id, || listener.on_progress(document));
        }
    }
}
