//! Queue processor -- the single background worker that drains the wait list.

use std::sync::atomic::Ordering;

use super::DownloadManager;
use super::download_task::{DownloadTaskContext, finalize_failure, run_download_task};

impl DownloadManager {
    /// Start the queue worker task
    ///
    /// This method spawns a background task that continuously:
    /// 1. Waits until a document is accepted, the poll interval elapses, or
    ///    shutdown is requested
    /// 2. Claims the head of the wait list (FIFO) as the active download
    /// 3. Downloads its pages to completion, failure or cancellation
    /// 4. Repeats until [`shutdown`](Self::shutdown)
    ///
    /// Exactly one document downloads at a time. A failing document never
    /// stops the loop, even when a collaborator panics.
    ///
    /// Only one worker runs per manager. Calling this while a worker is
    /// already running logs a warning and returns a handle to a task that
    /// finishes immediately.
    pub fn start_worker(&self) -> tokio::task::JoinHandle<()> {
        if self.queue_state.worker_running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Queue worker already running, not starting another");
            return tokio::spawn(async {});
        }

        let manager = self.clone();
        tokio::spawn(async move {
            manager.run_worker().await;
        })
    }

    async fn run_worker(self) {
        let poll_interval = self.config.queue.poll_interval;
        let state = self.queue_state.clone();

        tracing::info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Queue worker started"
        );

        loop {
            let claimed = {
                let mut queue = state.queue.lock().await;
                // checked under the lock so shutdown never races a claim
                if state.shutdown.is_cancelled() {
                    break;
                }
                queue.claim_next()
            };

            if let Some((document, cancel_token)) = claimed {
                tracing::debug!(
                    document_id = %document.id(),
                    name = document.name(),
                    "Claimed next document"
                );
                let ctx = DownloadTaskContext {
                    document,
                    cancel_token,
                    manager: self.clone(),
                };
                // Isolated in its own task so a panicking collaborator cannot
                // take the worker down; awaited to keep downloads single-flight.
                let task = tokio::spawn(run_download_task(ctx.clone()));
                if let Err(e) = task.await {
                    tracing::error!(
                        document_id = %ctx.id(),
                        error = %e,
                        "Download task aborted abnormally"
                    );
                    finalize_failure(&ctx, &format!("Download task aborted: {e}")).await;
                }
                continue;
            }

            // Nothing to do, wait for an accept, the next poll, or shutdown
            tokio::select! {
                _ = state.shutdown.cancelled() => break,
                _ = state.wake.notified() => {}
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }

        state.worker_running.store(false, Ordering::SeqCst);
        tracing::info!("Queue worker stopped");
    }
}
