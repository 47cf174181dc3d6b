//! Single-slot observer for download outcomes

use std::sync::{Arc, Mutex, PoisonError};

use super::{ListenerId, invoke_guarded};
use crate::types::Document;

/// Outcome delivered to an [`InteractionListener`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Every page downloaded
    Succeeded,
    /// Download failed or was cancelled
    Failed,
}

/// Observer told when a document finishes or fails
pub trait InteractionListener: Send + Sync {
    /// The document downloaded completely
    fn on_download_success(&self, document: &Document);

    /// The document failed or was cancelled
    fn on_download_fail(&self, document: &Document);
}

impl<F> InteractionListener for F
where
    F: Fn(Interaction, &Document) + Send + Sync,
{
    fn on_download_success(&self, document: &Document) {
        self(Interaction::Succeeded, document)
    }

    fn on_download_fail(&self, document: &Document) {
        self(Interaction::Failed, document)
    }
}

/// Holds at most one [`InteractionListener`]
///
/// Registering replaces the current observer. Unregistering only clears the
/// slot when the given id is the current registration. Events raised while the
/// slot is empty are dropped.
#[derive(Default)]
pub struct InteractionNotifier {
    slot: Mutex<Option<(ListenerId, Arc<dyn InteractionListener>)>>,
}

impl InteractionNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener`, replacing any previous one
    pub fn register(&self, listener: Arc<dyn InteractionListener>) -> ListenerId {
        let id = ListenerId::next();
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((id, listener));
        if let Some((old, _)) = previous {
            tracing::debug!(replaced = %old, listener = %id, "Interaction listener replaced");
        }
        id
    }

    /// Clear the slot if `id` is the current registration
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some((current, _)) if *current == id => {
                *slot = None;
                true
            }
            _ => {
                tracing::debug!(listener = %id, "Ignoring unregister of stale interaction listener");
                false
            }
        }
    }

    /// Whether an observer is installed
    pub fn is_registered(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Tell the observer `document` downloaded completely
    pub fn notify_success(&self, document: &Document) {
        self.notify(Interaction::Succeeded, document);
    }

    /// Tell the observer `document` failed
    pub fn notify_fail(&self, document: &Document) {
        self.notify(Interaction::Failed, document);
    }

    fn notify(&self, interaction: Interaction, document: &Document) {
        let current = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some((id, listener)) = current else {
            tracing::trace!(document_id = %document.id(), ?interaction, "No interaction listener registered");
            return;
        };

        invoke_guarded(id, || match interaction {
            Interaction::Succeeded => listener.on_download_success(document),
            Interaction::Failed => listener.on_download_fail(document),
        });
    }
}
