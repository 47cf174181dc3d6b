//! Core types for page-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::DuplicateAction;

/// Stable identifier for a document
///
/// All queue membership checks and equality comparisons go through this
/// identifier. Display names are never compared.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing stable token (catalog key, database id, ...)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from a source token such as the catalog URL
    ///
    /// The result is the lowercase hex SHA-256 digest of `source`, so two
    /// catalog entries that merely share a display name never collide.
    pub fn from_source(source: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(source.as_bytes())))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Download status of a document
///
/// `None → WaitDownload → Downloading → {Downloaded | None}`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not queued (initial state, or after failure/cancellation)
    #[default]
    None,
    /// Accepted and waiting for the worker
    WaitDownload,
    /// Pages are being fetched
    Downloading,
    /// Every page is on disk and metadata was persisted
    Downloaded,
}

/// A single page descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Where the page content is fetched from
    pub url: String,
}

impl Page {
    /// Create a page descriptor for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, Default)]
struct DocumentState {
    status: Status,
    downloaded_position: Option<usize>,
    accepted_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

struct DocumentInner {
    id: DocumentId,
    name: String,
    pages: Vec<Page>,
    state: Mutex<DocumentState>,
}

/// A multi-page document
///
/// `Document` is a shared handle: clones refer to the same status and
/// download cursor, so the caller keeps observing the state the worker writes.
/// Equality is identity-based ([`DocumentId`]).
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    /// Create a document with a fixed page list
    pub fn new(id: impl Into<DocumentId>, name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                id: id.into(),
                name: name.into(),
                pages,
                state: Mutex::new(DocumentState::default()),
            }),
        }
    }

    /// Rebuild a document from a persisted snapshot
    pub fn from_info(info: DocumentInfo) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                id: info.id,
                name: info.name,
                pages: info.pages,
                state: Mutex::new(DocumentState {
                    status: info.status,
                    downloaded_position: info.downloaded_position,
                    accepted_at: info.accepted_at,
                    finished_at: info.finished_at,
                }),
            }),
        }
    }

    /// Stable identifier
    pub fn id(&self) -> &DocumentId {
        &self.inner.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Ordered page descriptors
    pub fn pages(&self) -> &[Page] {
        &self.inner.pages
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.inner.pages.len()
    }

    /// Current status
    pub fn status(&self) -> Status {
        self.state().status
    }

    /// Whether the document finished downloading
    pub fn is_downloaded(&self) -> bool {
        self.status() == Status::Downloaded
    }

    /// Index of the last page fetched in the current (or last) run
    pub fn downloaded_position(&self) -> Option<usize> {
        self.state().downloaded_position
    }

    /// When the document was last accepted into the queue
    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.state().accepted_at
    }

    /// When the document last reached a terminal state
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.state().finished_at
    }

    /// Serializable snapshot of the document
    pub fn info(&self) -> DocumentInfo {
        let state = self.state().clone();
        DocumentInfo {
            id: self.inner.id.clone(),
            name: self.inner.name.clone(),
            pages: self.inner.pages.clone(),
            status: state.status,
            downloaded_position: state.downloaded_position,
            accepted_at: state.accepted_at,
            finished_at: state.finished_at,
        }
    }

    pub(crate) fn mark_accepted(&self) {
        let mut state = self.state();
        state.status = Status::WaitDownload;
        state.accepted_at = Some(Utc::now());
        state.finished_at = None;
    }

    /// Enter `Downloading` with a fresh cursor for the new run.
    pub(crate) fn begin_download(&self) {
        let mut state = self.state();
        state.status = Status::Downloading;
        state.downloaded_position = None;
    }

    pub(crate) fn advance_position(&self, index: usize) {
        let mut state = self.state();
        // pages are visited in ascending order within a run
        if state.downloaded_position.is_none_or(|p| index > p) {
            state.downloaded_position = Some(index);
        }
    }

    pub(crate) fn finish(&self, status: Status) {
        let mut state = self.state();
        state.status = status;
        state.finished_at = Some(Utc::now());
    }

    fn state(&self) -> MutexGuard<'_, DocumentState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Document {}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state().clone();
        f.debug_struct("Document")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("pages", &self.inner.pages.len())
            .field("status", &state.status)
            .field("downloaded_position", &state.downloaded_position)
            .finish()
    }
}

/// Serializable snapshot of a [`Document`], used for metadata persistence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Stable identifier
    pub id: DocumentId,
    /// Display name
    pub name: String,
    /// Ordered page descriptors
    pub pages: Vec<Page>,
    /// Status at snapshot time
    pub status: Status,
    /// Download cursor at snapshot time
    #[serde(default)]
    pub downloaded_position: Option<usize>,
    /// When the document was accepted
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the document reached a terminal state
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Result of fetching a single page
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page content was written to storage
    Fetched,
    /// Page could not be fetched this time; the batch continues
    Skipped,
}

/// Result of [`cancel_download`](crate::DownloadManager::cancel_download)
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Removed from the wait list before any page was fetched
    Dequeued,
    /// The in-flight download was signalled to stop
    Interrupted,
    /// The queue does not know the document (completed, failed, or foreign)
    NotQueued,
}

/// Point-in-time counts of the queue lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Documents waiting for the worker
    pub waiting: usize,
    /// Whether a document is currently downloading
    pub active: bool,
    /// Documents that finished downloading
    pub completed: usize,
    /// Documents that failed or were cancelled
    pub failed: usize,
}

/// Event emitted during the queue lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Document added to the wait list
    Queued {
        /// Document ID
        id: DocumentId,
        /// Display name
        name: String,
    },

    /// Document was accepted while already queued
    DuplicateDetected {
        /// Document ID
        id: DocumentId,
        /// Display name
        name: String,
        /// How the duplicate was handled
        action: DuplicateAction,
    },

    /// Worker started downloading a document
    Started {
        /// Document ID
        id: DocumentId,
        /// Number of pages in the document
        total_pages: usize,
    },

    /// A page was fetched
    Progress {
        /// Document ID
        id: DocumentId,
        /// Index of the page just fetched
        position: usize,
        /// Number of pages in the document
        total_pages: usize,
        /// Progress percentage (0.0 to 100.0)
        percent: f32,
    },

    /// A page fetch returned without content; the batch continues
    PageSkipped {
        /// Document ID
        id: DocumentId,
        /// Index of the skipped page
        page: usize,
    },

    /// Every page downloaded and metadata persisted
    Completed {
        /// Document ID
        id: DocumentId,
    },

    /// Download failed
    DownloadFailed {
        /// Document ID
        id: DocumentId,
        /// Error message
        error: String,
    },

    /// Download cancelled by the caller
    Cancelled {
        /// Document ID
        id: DocumentId,
        /// Whether the document was in flight (vs still waiting)
        was_active: bool,
    },

    /// Worker stopped
    Shutdown,
}

/// Progress percentage for a page cursor
pub(crate) fn progress_percent(position: usize, total_pages: usize) -> f32 {
    if total_pages == 0 {
        return 100.0;
    }
    ((position + 1) as f32 / total_pages as f32) * 100.0
}
