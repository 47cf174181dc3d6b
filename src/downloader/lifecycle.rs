//! Shutdown coordination.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::types::{Document, Event, Status};

use super::DownloadManager;

impl DownloadManager {
    /// Stop the queue worker
    ///
    /// This method performs a shutdown sequence:
    /// 1. Signals the worker loop to stop
    /// 2. Interrupts the active download, resolving it as failed
    /// 3. Waits for the worker to exit, bounded by `shutdown_timeout`
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Waiting documents stay in the wait list with status `WaitDownload`.
    /// The worker cannot be restarted on a manager that was shut down.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop the worker loop
        self.queue_state.shutdown.cancel();

        // 2. Interrupt the in-flight document
        if let Some(document) = self.interrupt_active("shutdown").await {
            tracing::info!(document_id = %document.id(), "Interrupted active download");
        }

        // 3. Wait for the worker to exit with timeout
        let shutdown_timeout = self.config.queue.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.wait_for_worker()).await {
            Ok(()) => tracing::info!("Queue worker stopped"),
            Err(_) => tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Timeout waiting for queue worker to stop, proceeding with shutdown"
            ),
        }

        // 4. Emit shutdown event
        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
    }

    /// Cancel the active download and resolve it as failed with `reason`
    ///
    /// Returns the interrupted document, or `None` if nothing was active.
    pub(crate) async fn interrupt_active(&self, reason: &str) -> Option<Document> {
        let mut queue = self.queue_state.queue.lock().await;
        let active = queue.take_active()?;
        active.cancel_token.cancel();
        active.document.finish(Status::None);
        queue.record_failed(active.document.clone());
        drop(queue);

        let document = active.document;
        tracing::warn!(document_id = %document.id(), reason, "Active download interrupted");
        self.emit_event(Event::DownloadFailed {
            id: document.id().clone(),
            error: reason.to_string(),
        });
        self.listeners.interaction.notify_fail(&document);

        Some(document)
    }

    /// Wait for the worker loop to exit
    async fn wait_for_worker(&self) {
        while self.queue_state.worker_running.load(Ordering::SeqCst) {
            tracing::debug!("Waiting for queue worker to stop");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
