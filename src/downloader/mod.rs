//! Core download manager split into focused submodules.
//!
//! The `DownloadManager` struct and its methods are organized by concern:
//! - [`queue`] - Wait list, active slot and history bookkeeping
//! - [`control`] - Accept, cancel and queue inspection
//! - [`listeners`] - Progress and interaction listener registration
//! - [`queue_processor`] - The background worker loop
//! - [`download_task`] - Per-document page download procedure
//! - [`lifecycle`] - Shutdown coordination

mod control;
mod download_task;
mod lifecycle;
mod listeners;
mod queue;
mod queue_processor;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::{Mutex, Notify, broadcast};
use tokio_util::sync::CancellationToken;

use crate::collaborators::Collaborators;
use crate::config::Config;
use crate::error::Result;
use crate::listeners::{InteractionNotifier, ProgressBroadcaster};
use crate::types::Event;

pub(crate) use queue::DownloadQueue;

/// Queue lists and worker coordination
#[derive(Clone)]
pub(crate) struct QueueState {
    /// Wait list, active slot and histories (single critical section)
    pub(crate) queue: Arc<Mutex<DownloadQueue>>,
    /// Wakes the worker as soon as a document is accepted
    pub(crate) wake: Arc<Notify>,
    /// Stops the worker loop
    pub(crate) shutdown: CancellationToken,
    /// Whether a worker loop is currently running
    pub(crate) worker_running: Arc<AtomicBool>,
}

/// Progress and interaction observers
#[derive(Clone, Default)]
pub(crate) struct ListenerRegistry {
    pub(crate) progress: Arc<ProgressBroadcaster>,
    pub(crate) interaction: Arc<InteractionNotifier>,
}

/// Sequential download queue for multi-page documents (cloneable - all fields are Arc-wrapped)
///
/// Construct one per process at the composition root and hand clones to
/// whoever needs to accept, cancel or observe downloads.
#[derive(Clone)]
pub struct DownloadManager {
    /// Configuration (wrapped in Arc for sharing with the worker)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Page fetching, storage and catalog capabilities
    pub(crate) collaborators: Collaborators,
    /// Queue lists and worker coordination
    pub(crate) queue_state: QueueState,
    /// Progress and interaction observers
    pub(crate) listeners: ListenerRegistry,
}

impl DownloadManager {
    /// Create a new DownloadManager
    ///
    /// The worker is not started; call [`start_worker`](Self::start_worker).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(config.queue.event_channel_capacity);

        let queue_state = QueueState {
            queue: Arc::new(Mutex::new(DownloadQueue::new())),
            wake: Arc::new(Notify::new()),
            shutdown: CancellationToken::new(),
            worker_running: Arc::new(AtomicBool::new(false)),
        };

        tracing::debug!(
            poll_interval_ms = config.queue.poll_interval.as_millis() as u64,
            duplicate_action = ?config.queue.duplicate_action,
            "Download manager created"
        );

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            collaborators,
            queue_state,
            listeners: ListenerRegistry::default(),
        })
    }

    /// Create a DownloadManager with the default HTTP + filesystem adapters
    pub fn from_config(config: Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(&config)?;
        Self::new(config, collaborators)
    }

    /// Subscribe to queue events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events
    /// independently. A subscriber that falls behind by more than
    /// `event_channel_capacity` events receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use page_dl::{Config, DownloadManager, Event};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let manager = DownloadManager::from_config(Config::default())?;
    ///
    ///     let mut events = manager.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             if let Event::Progress { id, percent, .. } = event {
    ///                 println!("{id}: {percent:.0}%");
    ///             }
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
