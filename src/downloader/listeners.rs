//! Listener registration on the manager.

use std::sync::Arc;

use crate::listeners::{InteractionListener, ListenerId, ProgressListener};

use super::DownloadManager;

impl DownloadManager {
    /// Install the interaction listener, replacing any previous one
    ///
    /// Only one interaction listener exists at a time (typically the screen
    /// currently in the foreground).
    pub fn register_interaction_listener(
        &self,
        listener: Arc<dyn InteractionListener>,
    ) -> ListenerId {
        self.listeners.interaction.register(listener)
    }

    /// Remove the interaction listener registered under `id`
    ///
    /// A stale id (a newer listener has since been registered) leaves the
    /// current listener in place and returns `false`.
    pub fn unregister_interaction_listener(&self, id: ListenerId) -> bool {
        self.listeners.interaction.unregister(id)
    }

    /// Add a progress listener
    pub fn register_progress_listener(&self, listener: Arc<dyn ProgressListener>) -> ListenerId {
        self.listeners.progress.register(listener)
    }

    /// Remove one progress listener; returns `false` if it was not registered
    pub fn unregister_progress_listener(&self, id: ListenerId) -> bool {
        self.listeners.progress.unregister(id)
    }

    /// Remove every progress listener
    pub fn clear_progress_listeners(&self) {
        self.listeners.progress.clear();
    }
}
