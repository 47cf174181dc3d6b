//! Queue list bookkeeping.
//!
//! [`DownloadQueue`] owns the wait list, the active slot and the two history
//! lists. It performs no I/O, emits no events and has no internal locking: the
//! [`DownloadManager`](super::DownloadManager) keeps it behind a single mutex
//! and every mutation happens inside that critical section.

use std::collections::VecDeque;

use tokio_util::sync::CancellationToken;

use crate::types::{Document, DocumentId, QueueStats};

/// The document currently being downloaded and the token that stops it
pub(crate) struct ActiveDownload {
    pub(crate) document: Document,
    pub(crate) cancel_token: CancellationToken,
}

/// Wait list, active slot, and completed/failed histories
#[derive(Default)]
pub(crate) struct DownloadQueue {
    waiting: VecDeque<Document>,
    active: Option<ActiveDownload>,
    completed: Vec<Document>,
    failed: Vec<Document>,
}

impl DownloadQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append to the tail of the wait list
    pub(crate) fn push_waiting(&mut self, document: Document) {
        self.waiting.push_back(document);
    }

    /// Whether `id` is waiting or active
    pub(crate) fn is_queued(&self, id: &DocumentId) -> bool {
        self.waiting.iter().any(|d| d.id() == id) || self.is_active(id)
    }

    /// Whether `id` occupies the active slot
    pub(crate) fn is_active(&self, id: &DocumentId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.document.id() == id)
    }

    /// Remove every waiting entry for `id`, returning the first one removed
    pub(crate) fn remove_waiting(&mut self, id: &DocumentId) -> Option<Document> {
        let position = self.waiting.iter().position(|d| d.id() == id)?;
        let removed = self.waiting.remove(position);
        self.waiting.retain(|d| d.id() != id);
        removed
    }

    /// Move the head of the wait list into the active slot
    ///
    /// Returns `None` while a download is active or when nothing is waiting.
    pub(crate) fn claim_next(&mut self) -> Option<(Document, CancellationToken)> {
        if self.active.is_some() {
            return None;
        }
        let document = self.waiting.pop_front()?;
        let cancel_token = CancellationToken::new();
        self.active = Some(ActiveDownload {
            document: document.clone(),
            cancel_token: cancel_token.clone(),
        });
        Some((document, cancel_token))
    }

    /// The active download, if any
    pub(crate) fn active(&self) -> Option<&ActiveDownload> {
        self.active.as_ref()
    }

    /// Vacate the active slot
    pub(crate) fn take_active(&mut self) -> Option<ActiveDownload> {
        self.active.take()
    }

    /// Append to the completed history, dropping any failed entry for the same id
    pub(crate) fn record_completed(&mut self, document: Document) {
        self.failed.retain(|d| d != &document);
        self.completed.retain(|d| d != &document);
        self.completed.push(document);
    }

    /// Append to the failed history, dropping any completed entry for the same id
    pub(crate) fn record_failed(&mut self, document: Document) {
        self.completed.retain(|d| d != &document);
        self.failed.retain(|d| d != &document);
        self.failed.push(document);
    }

    pub(crate) fn waiting(&self) -> Vec<Document> {
        self.waiting.iter().cloned().collect()
    }

    pub(crate) fn active_document(&self) -> Option<Document> {
        self.active.as_ref().map(|active| active.document.clone())
    }

    pub(crate) fn completed(&self) -> Vec<Document> {
        self.completed.clone()
    }

    pub(crate) fn failed(&self) -> Vec<Document> {
        self.failed.clone()
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats {
            waiting: self.waiting.len(),
            active: self.active.is_some(),
            completed: self.completed.len(),
            failed: self.failed.len(),
        }
    }
}
