//! Traits for the capabilities the download worker consumes

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Document, PageOutcome};

/// Fetches individual pages of a document
///
/// The worker calls these methods strictly sequentially for one document at a
/// time, in ascending page order.
///
/// Return values carry two different failure classes:
/// - `Ok(PageOutcome::Skipped)` is a recoverable skip: the worker records the
///   page as missing and continues with the next page.
/// - `Err(_)` is a fault: the worker aborts the whole document immediately.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Whether page `index` of `document` is already stored
    async fn is_page_present(&self, document: &Document, index: usize) -> Result<bool>;

    /// Fetch page `index` of `document` and store it
    async fn fetch_page(&self, document: &Document, index: usize) -> Result<PageOutcome>;
}

/// Per-document storage owned outside the queue
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure the directory pages are written into exists
    async fn create_document_dir(&self, document: &Document) -> Result<()>;

    /// Persist the document's metadata after a successful download
    async fn persist_metadata(&self, document: &Document) -> Result<()>;
}

/// Local catalog of downloaded documents
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Re-scan local storage after a document finished downloading
    async fn refresh(&self) -> Result<()>;
}

/// The set of collaborators a [`DownloadManager`](crate::DownloadManager) drives
#[derive(Clone)]
pub struct Collaborators {
    /// Page fetching
    pub fetcher: Arc<dyn PageFetcher>,
    /// Directory creation and metadata persistence
    pub storage: Arc<dyn Storage>,
    /// Refresh signal after a successful download
    pub catalog: Arc<dyn Catalog>,
}

impl Collaborators {
    /// Bundle collaborator implementations
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        storage: Arc<dyn Storage>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            fetcher,
            storage,
            catalog,
        }
    }
}
