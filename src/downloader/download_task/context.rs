//! Download task context -- the claimed document and everything needed to resolve it.

use tokio_util::sync::CancellationToken;

use crate::types::{Document, DocumentId};

use super::super::DownloadManager;

/// Shared context for a single download task, reducing parameter passing between helpers.
#[derive(Clone)]
pub(crate) struct DownloadTaskContext {
    pub(crate) document: Document,
    /// Cancelled by `cancel_download` or `shutdown`, which then own the outcome
    pub(crate) cancel_token: CancellationToken,
    pub(crate) manager: DownloadManager,
}

impl DownloadTaskContext {
    pub(crate) fn id(&self) -> &DocumentId {
        self.document.id()
    }

    /// Enter `Downloading` unless the claim was cancelled in the meantime.
    ///
    /// Returns `false` when cancelled; the caller must not touch the document.
    pub(super) async fn begin_downloading(&self) -> bool {
        let _queue = self.manager.queue_state.queue.lock().await;
        if self.cancel_token.is_cancelled() {
            return false;
        }
        self.document.begin_download();
        true
    }
}
