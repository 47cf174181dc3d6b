//! Test configuration helpers for creating managers backed by a temp directory

use std::time::Duration;

use page_dl::{Config, DownloadManager, Event};
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Config pointing storage at `temp_dir`, with a short poll interval
pub fn create_test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.queue.poll_interval = Duration::from_millis(20);
    config.queue.shutdown_timeout = Duration::from_secs(2);
    config.storage.root_dir = temp_dir.path().join("library");
    config.http.timeout = Duration::from_secs(5);
    config
}

/// Manager using the default HTTP + filesystem adapters, with a running worker.
///
/// Returns the manager and the temp dir (which must be kept alive).
pub fn create_test_manager() -> (DownloadManager, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = DownloadManager::from_config(create_test_config(&temp_dir)).unwrap();
    let _worker = manager.start_worker();
    (manager, temp_dir)
}

/// Wait up to 10 seconds for the first event matching `predicate`
pub async fn wait_for_event<F>(events: &mut broadcast::Receiver<Event>, mut predicate: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
