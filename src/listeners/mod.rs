//! Observer registries for download progress and outcome notifications
//!
//! - [`ProgressBroadcaster`]: any number of progress listeners, invoked in
//!   registration order on the worker task
//! - [`InteractionNotifier`]: a single observer (typically the visible screen)
//!   told when a document succeeded or failed
//!
//! Registration hands back a [`ListenerId`]. Unregistering with a stale id is a
//! no-op, so an observer being torn down can never remove a newer one.

mod interaction;
mod progress;

pub use interaction::{Interaction, InteractionListener, InteractionNotifier};
pub use progress::{ProgressBroadcaster, ProgressListener};

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying a registered listener
///
/// Ids are unique for the lifetime of the process, across all registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Run a listener callback, containing any panic to the callback itself
pub(crate) fn invoke_guarded(listener_id: ListenerId, callback: impl FnOnce()) {
    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)).is_err() {
        tracing::error!(listener = %listener_id, "Listener panicked during notification");
    }
}
