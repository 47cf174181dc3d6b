//! Download task orchestration -- top-level lifecycle for a single document.

use crate::types::Event;

use super::context::DownloadTaskContext;
use super::finalization::{finalize_failure, finalize_success};
use super::pages::{PagesResult, download_pages};

/// Core download task -- orchestrates the full lifecycle of a single document.
///
/// Phases:
/// 1. Prepare the document directory
/// 2. Transition to Downloading state
/// 3. Fetch pages sequentially
/// 4. Resolve the document as completed or failed
///
/// If the document is cancelled at any point the cancel path has already
/// resolved it and the task returns without further changes.
pub(crate) async fn run_download_task(ctx: DownloadTaskContext) {
    let total_pages = ctx.document.page_count();

    // Phase 1: Document directory
    if let Err(e) = ctx
        .manager
        .collaborators
        .storage
        .create_document_dir(&ctx.document)
        .await
    {
        tracing::error!(
            document_id = %ctx.id(),
            error = %e,
            "Failed to create document directory"
        );
        finalize_failure(&ctx, &format!("Failed to create document directory: {e}")).await;
        return;
    }

    // Phase 2: Downloading
    if !ctx.begin_downloading().await {
        tracing::debug!(document_id = %ctx.id(), "Document cancelled before download started");
        return;
    }
    tracing::info!(
        document_id = %ctx.id(),
        name = ctx.document.name(),
        total_pages,
        "Starting document download"
    );
    ctx.manager.emit_event(Event::Started {
        id: ctx.id().clone(),
        total_pages,
    });

    // Phase 3: Pages
    let result = download_pages(&ctx).await;

    // Phase 4: Finalize
    match result {
        Ok(PagesResult::Complete) => finalize_success(&ctx).await,
        Ok(PagesResult::Incomplete { skipped }) => {
            tracing::warn!(
                document_id = %ctx.id(),
                skipped,
                total_pages,
                "Document download incomplete"
            );
            finalize_failure(&ctx, &format!("{skipped} of {total_pages} pages skipped")).await;
        }
        Ok(PagesResult::Cancelled) => {
            tracing::debug!(document_id = %ctx.id(), "Document download stopped by cancellation");
        }
        Err(e) => {
            tracing::error!(
                document_id = %ctx.id(),
                error = %e,
                error_code = e.error_code(),
                "Document download aborted"
            );
            finalize_failure(&ctx, &e.to_string()).await;
        }
    }
}
