//! Sequential page fetching.

use crate::error::Result;
use crate::types::{Event, PageOutcome, progress_percent};

use super::context::DownloadTaskContext;

/// How the page loop ended
#[derive(Debug, PartialEq, Eq)]
pub(super) enum PagesResult {
    /// Every page is stored
    Complete,
    /// The loop ran to the end but some pages were skipped
    Incomplete { skipped: usize },
    /// The cancellation token fired
    Cancelled,
}

/// Fetch every missing page of the document, one at a time, in index order.
///
/// Pages already stored are not fetched again but still advance the cursor.
/// A skipped page is recorded and the loop moves on; an `Err` from the fetcher
/// aborts the loop and is returned. Each fetcher call is raced against the
/// cancellation token, so a cancel drops the call in flight.
pub(super) async fn download_pages(ctx: &DownloadTaskContext) -> Result<PagesResult> {
    let document = &ctx.document;
    let fetcher = &ctx.manager.collaborators.fetcher;
    let total_pages = document.page_count();
    let mut skipped = 0usize;

    for index in 0..total_pages {
        if ctx.cancel_token.is_cancelled() {
            return Ok(PagesResult::Cancelled);
        }

        let present = tokio::select! {
            biased;
            _ = ctx.cancel_token.cancelled() => return Ok(PagesResult::Cancelled),
            present = fetcher.is_page_present(document, index) => present?,
        };
        if present {
            tracing::trace!(document_id = %ctx.id(), page = index, "Page already stored");
            document.advance_position(index);
            continue;
        }

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancel_token.cancelled() => return Ok(PagesResult::Cancelled),
            outcome = fetcher.fetch_page(document, index) => outcome?,
        };

        match outcome {
            PageOutcome::Fetched => {
                document.advance_position(index);
                ctx.manager.listeners.progress.dispatch_progress(document);
                ctx.manager.emit_event(Event::Progress {
                    id: ctx.id().clone(),
                    position: index,
                    total_pages,
                    percent: progress_percent(index, total_pages),
                });
            }
            PageOutcome::Skipped => {
                skipped += 1;
                tracing::warn!(document_id = %ctx.id(), page = index, "Page skipped");
                ctx.manager.emit_event(Event::PageSkipped {
                    id: ctx.id().clone(),
                    page: index,
                });
            }
        }
    }

    if skipped == 0 {
        Ok(PagesResult::Complete)
    } else {
        Ok(PagesResult::Incomplete { skipped })
    }
}
