//! # page-dl
//!
//! Sequential download queue for multi-page documents (books, comics,
//! scanned archives).
//!
//! ## Design Philosophy
//!
//! page-dl is designed to be:
//! - **One at a time** - A single background worker downloads documents in
//!   the order they were accepted, page by page
//! - **Pluggable** - Fetching, storage and the local catalog are traits; HTTP
//!   and filesystem adapters are included
//! - **Observable** - Progress and outcome listeners, plus a broadcast event
//!   channel
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use page_dl::{Config, Document, DownloadManager, Interaction, Page};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = DownloadManager::from_config(Config::default())?;
//!     let _worker = manager.start_worker();
//!
//!     manager.register_progress_listener(Arc::new(|doc: &Document| {
//!         println!("{}: page {:?}", doc.name(), doc.downloaded_position());
//!     }));
//!     manager.register_interaction_listener(Arc::new(|outcome: Interaction, doc: &Document| {
//!         println!("{} finished: {outcome:?}", doc.name());
//!     }));
//!
//!     let pages = vec![
//!         Page::new("https://example.com/book/1.jpg"),
//!         Page::new("https://example.com/book/2.jpg"),
//!     ];
//!     manager.accept(Document::new("book-1", "My Book", pages)).await;
//!
//!     page_dl::run_with_shutdown(manager).await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Page fetching, storage and catalog capabilities with default adapters
pub mod collaborators;
/// Configuration types
pub mod config;
/// Core download manager implementation
pub mod downloader;
/// Error types
pub mod error;
/// Progress and interaction listeners
pub mod listeners;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use collaborators::{
    Catalog, Collaborators, FsStorage, HttpPageFetcher, NoOpCatalog, PageFetcher, Storage,
};
pub use config::{Config, DuplicateAction, HttpConfig, QueueConfig, StorageConfig};
pub use downloader::DownloadManager;
pub use error::{Error, Result};
pub use listeners::{
    Interaction, InteractionListener, InteractionNotifier, ListenerId, ProgressBroadcaster,
    ProgressListener,
};
pub use types::{
    CancelOutcome, Document, DocumentId, DocumentInfo, Event, Page, PageOutcome, QueueStats,
    Status,
};

/// Wait for a termination signal, then shut the manager down.
///
/// - **Unix:** listens for SIGTERM and SIGINT. If a handler cannot be
///   registered the other one is used, and `ctrl_c` as a last resort.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use page_dl::{Config, DownloadManager, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = DownloadManager::from_config(Config::default())?;
///     let _worker = manager.start_worker();
///
///     run_with_shutdown(manager).await;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(manager: DownloadManager) {
    wait_for_signal().await;
    manager.shutdown().await;
}

/// Resolve on SIGTERM or Ctrl+C (SIGINT)
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
            result = tokio::signal::ctrl_c() => log_interrupt(result),
        },
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
            log_interrupt(tokio::signal::ctrl_c().await);
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    log_interrupt(tokio::signal::ctrl_c().await);
}

fn log_interrupt(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}
