//! Download finalization -- resolve the active document as completed or failed.
//!
//! Both paths re-check the cancellation token under the queue lock. Once a
//! cancel has resolved the document, the worker leaves it alone.

use crate::types::{Event, Status};

use super::super::DownloadQueue;
use super::context::DownloadTaskContext;

/// Mark the document downloaded, persist its metadata and move it to the
/// completed history, then refresh the catalog and notify.
///
/// Metadata is written outside the queue lock, so the foreground stays
/// responsive during the disk write. A persistence error fails the document
/// instead. A catalog refresh error is logged and does not change the outcome.
pub(super) async fn finalize_success(ctx: &DownloadTaskContext) {
    let manager = &ctx.manager;
    {
        let _queue = manager.queue_state.queue.lock().await;
        if ctx.cancel_token.is_cancelled() {
            return;
        }
        ctx.document.finish(Status::Downloaded);
    }

    let persisted = manager
        .collaborators
        .storage
        .persist_metadata(&ctx.document)
        .await;

    let mut queue = manager.queue_state.queue.lock().await;
    // a cancel during the write has already resolved the document
    if ctx.cancel_token.is_cancelled() {
        return;
    }
    if let Err(e) = persisted {
        tracing::error!(
            document_id = %ctx.id(),
            error = %e,
            "Failed to persist document metadata"
        );
        resolve_failed(ctx, &mut queue);
        drop(queue);
        announce_failure(ctx, &format!("Failed to persist metadata: {e}"));
        return;
    }

    queue.take_active();
    queue.record_completed(ctx.document.clone());
    drop(queue);

    if let Err(e) = manager.collaborators.catalog.refresh().await {
        tracing::warn!(
            document_id = %ctx.id(),
            error = %e,
            "Catalog refresh failed after download"
        );
    }

    tracing::info!(
        document_id = %ctx.id(),
        name = ctx.document.name(),
        total_pages = ctx.document.page_count(),
        "Document download complete"
    );
    manager.emit_event(Event::Completed {
        id: ctx.id().clone(),
    });
    manager.listeners.interaction.notify_success(&ctx.document);
}

/// Mark the document failed and move it to the failed history, then notify.
pub(crate) async fn finalize_failure(ctx: &DownloadTaskContext, error: &str) {
    let mut queue = ctx.manager.queue_state.queue.lock().await;
    if ctx.cancel_token.is_cancelled() {
        return;
    }
    resolve_failed(ctx, &mut queue);
    drop(queue);

    announce_failure(ctx, error);
}

fn resolve_failed(ctx: &DownloadTaskContext, queue: &mut DownloadQueue) {
    ctx.document.finish(Status::None);
    queue.take_active();
    queue.record_failed(ctx.document.clone());
}

fn announce_failure(ctx: &DownloadTaskContext, error: &str) {
    tracing::warn!(document_id = %ctx.id(), error, "Document download failed");
    ctx.manager.emit_event(Event::DownloadFailed {
        id: ctx.id().clone(),
        error: error.to_string(),
    });
    ctx.manager.listeners.interaction.notify_fail(&ctx.document);
}
