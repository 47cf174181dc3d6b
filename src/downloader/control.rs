//! Queue control -- accept, cancel, and inspection.

use crate::config::DuplicateAction;
use crate::types::{CancelOutcome, Document, Event, QueueStats, Status};

use super::DownloadManager;

impl DownloadManager {
    /// Add a document to the tail of the wait list
    ///
    /// Sets the document's status to [`Status::WaitDownload`] and wakes the
    /// worker. This is fire-and-forget: the outcome is reported through the
    /// interaction listener, progress listeners and [`Event`]s.
    ///
    /// Accepting a document that is already queued is governed by
    /// [`DuplicateAction`]. Callers that want to avoid duplicates should check
    /// [`is_queued`](Self::is_queued) first.
    ///
    /// A document that previously failed may be accepted again and will be
    /// retried from its first missing page. Re-accepting the document that is
    /// currently downloading queues another run but leaves the status of the
    /// run in flight untouched.
    pub async fn accept(&self, document: Document) {
        let mut queue = self.queue_state.queue.lock().await;

        if queue.is_queued(document.id()) {
            let action = self.config.queue.duplicate_action;
            match action {
                DuplicateAction::Allow => {}
                DuplicateAction::Warn => tracing::warn!(
                    document_id = %document.id(),
                    name = document.name(),
                    "Document accepted while already queued"
                ),
                DuplicateAction::Block => tracing::info!(
                    document_id = %document.id(),
                    name = document.name(),
                    "Ignoring duplicate accept of queued document"
                ),
            }
            if action != DuplicateAction::Allow {
                self.emit_event(Event::DuplicateDetected {
                    id: document.id().clone(),
                    name: document.name().to_string(),
                    action,
                });
            }
            if action == DuplicateAction::Block {
                return;
            }
        }

        // the active handle's status belongs to the run in flight; the queued
        // copy enters Downloading when it is claimed
        if !queue.is_active(document.id()) {
            document.mark_accepted();
        }
        queue.push_waiting(document.clone());
        let waiting = queue.stats().waiting;
        drop(queue);

        tracing::info!(
            document_id = %document.id(),
            name = document.name(),
            pages = document.page_count(),
            waiting,
            "Document queued"
        );
        self.emit_event(Event::Queued {
            id: document.id().clone(),
            name: document.name().to_string(),
        });
        self.queue_state.wake.notify_one();
    }

    /// Whether the document is waiting or currently downloading
    pub async fn is_queued(&self, document: &Document) -> bool {
        self.queue_state.queue.lock().await.is_queued(document.id())
    }

    /// Cancel a waiting or in-flight download
    ///
    /// - A waiting document is removed from the wait list immediately; its
    ///   pages are never fetched.
    /// - The active document's download is signalled to stop. The fetch in
    ///   flight is abandoned and no further page is started.
    /// - A document that is both active and waiting again (re-accepted while
    ///   downloading) loses both entries and reports
    ///   [`CancelOutcome::Interrupted`].
    ///
    /// In every case the document's status returns to [`Status::None`], it is
    /// appended to the failed history and the interaction listener is told it
    /// failed. Cancelling a document the queue does not know is a logged no-op.
    pub async fn cancel_download(&self, document: &Document) -> CancelOutcome {
        let mut queue = self.queue_state.queue.lock().await;

        let dequeued = queue.remove_waiting(document.id());
        let interrupted = if queue
            .active()
            .is_some_and(|a| a.document.id() == document.id() && !a.cancel_token.is_cancelled())
        {
            queue.take_active()
        } else {
            None
        };

        let (outcome, cancelled) = match (interrupted, dequeued) {
            (Some(active), waiting) => {
                active.cancel_token.cancel();
                // a re-accepted copy may be a separate handle
                if let Some(waiting) = waiting {
                    waiting.finish(Status::None);
                }
                (CancelOutcome::Interrupted, active.document)
            }
            (None, Some(waiting)) => (CancelOutcome::Dequeued, waiting),
            (None, None) => {
                drop(queue);
                tracing::debug!(
                    document_id = %document.id(),
                    name = document.name(),
                    "Cancel requested for document not in queue"
                );
                return CancelOutcome::NotQueued;
            }
        };

        cancelled.finish(Status::None);
        queue.record_failed(cancelled.clone());
        drop(queue);

        let was_active = outcome == CancelOutcome::Interrupted;
        tracing::info!(
            document_id = %cancelled.id(),
            name = cancelled.name(),
            was_active,
            "Download cancelled"
        );
        self.emit_event(Event::Cancelled {
            id: cancelled.id().clone(),
            was_active,
        });
        self.listeners.interaction.notify_fail(&cancelled);

        outcome
    }

    /// Documents waiting for the worker, in start order
    pub async fn waiting_documents(&self) -> Vec<Document> {
        self.queue_state.queue.lock().await.waiting()
    }

    /// The document currently downloading, if any
    pub async fn active_document(&self) -> Option<Document> {
        self.queue_state.queue.lock().await.active_document()
    }

    /// Documents that finished downloading, oldest first
    pub async fn completed_documents(&self) -> Vec<Document> {
        self.queue_state.queue.lock().await.completed()
    }

    /// Documents that failed or were cancelled, oldest first
    pub async fn failed_documents(&self) -> Vec<Document> {
        self.queue_state.queue.lock().await.failed()
    }

    /// Counts of every queue list
    pub async fn stats(&self) -> QueueStats {
        self.queue_state.queue.lock().await.stats()
    }
}
