//! Shared test helpers: scripted collaborators and a ready-to-use manager.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

use crate::collaborators::{Catalog, Collaborators, PageFetcher, Storage};
use crate::config::Config;
use crate::downloader::DownloadManager;
use crate::error::{Error, Result};
use crate::listeners::{Interaction, InteractionListener};
use crate::types::{Document, DocumentId, DocumentInfo, Event, Page, PageOutcome};

/// Scripted behavior of a single page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PageScript {
    /// Fetch succeeds (default for unscripted pages)
    Fetch,
    /// Fetch returns `PageOutcome::Skipped`
    Skip,
    /// Fetch returns an error
    Fail,
    /// Page is already stored; fetch must not be called
    Present,
    /// Fetch blocks until `release` is notified, then succeeds
    Hold,
    /// Fetch panics
    Panic,
}

/// Page fetcher driven by per-page scripts, recording every call
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    scripts: Mutex<HashMap<(DocumentId, usize), PageScript>>,
    fetches: Mutex<Vec<(DocumentId, usize)>>,
    presence_checks: Mutex<Vec<(DocumentId, usize)>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Notified when a `Hold` page starts fetching
    pub(crate) hold_entered: Notify,
    /// Lets a `Hold` page finish
    pub(crate) release: Notify,
}

impl ScriptedFetcher {
    pub(crate) fn script(&self, id: &str, page: usize, script: PageScript) {
        self.scripts
            .lock()
            .unwrap()
            .insert((DocumentId::new(id), page), script);
    }

    /// Make every fetch take at least `delay`
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every `fetch_page` call, in call order
    pub(crate) fn fetches(&self) -> Vec<(DocumentId, usize)> {
        self.fetches.lock().unwrap().clone()
    }

    /// Fetched page indices of one document, in call order
    pub(crate) fn fetched_pages(&self, id: &str) -> Vec<usize> {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|(doc, _)| doc.as_str() == id)
            .map(|(_, page)| *page)
            .collect()
    }

    /// Order in which documents were first fetched
    pub(crate) fn document_order(&self) -> Vec<DocumentId> {
        let mut order: Vec<DocumentId> = Vec::new();
        for (id, _) in self.fetches.lock().unwrap().iter() {
            if !order.contains(id) {
                order.push(id.clone());
            }
        }
        order
    }

    pub(crate) fn presence_checks(&self) -> Vec<(DocumentId, usize)> {
        self.presence_checks.lock().unwrap().clone()
    }

    /// Highest number of fetches observed running at the same time
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn script_for(&self, id: &DocumentId, page: usize) -> PageScript {
        self.scripts
            .lock()
            .unwrap()
            .get(&(id.clone(), page))
            .copied()
            .unwrap_or(PageScript::Fetch)
    }
}

/// Decrements the in-flight counter even when the fetch future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn is_page_present(&self, document: &Document, index: usize) -> Result<bool> {
        self.presence_checks
            .lock()
            .unwrap()
            .push((document.id().clone(), index));
        Ok(self.script_for(document.id(), index) == PageScript::Present)
    }

    async fn fetch_page(&self, document: &Document, index: usize) -> Result<PageOutcome> {
        self.fetches
            .lock()
            .unwrap()
            .push((document.id().clone(), index));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.script_for(document.id(), index) {
            PageScript::Fetch | PageScript::Present => Ok(PageOutcome::Fetched),
            PageScript::Skip => Ok(PageOutcome::Skipped),
            PageScript::Fail => Err(Error::Fetch {
                document: document.id().clone(),
                page: index,
                message: "scripted failure".to_string(),
            }),
            PageScript::Hold => {
                self.hold_entered.notify_one();
                self.release.notified().await;
                Ok(PageOutcome::Fetched)
            }
            PageScript::Panic => panic!("scripted panic fetching page {index}"),
        }
    }
}

/// Storage that records calls and can be told to fail
#[derive(Default)]
pub(crate) struct RecordingStorage {
    pub(crate) created: Mutex<Vec<DocumentId>>,
    pub(crate) persisted: Mutex<Vec<DocumentInfo>>,
    pub(crate) fail_create: AtomicBool,
    pub(crate) fail_persist: AtomicBool,
    /// When set, `persist_metadata` blocks until `persist_release` is notified
    pub(crate) hold_persist: AtomicBool,
    /// Notified when a held `persist_metadata` starts
    pub(crate) persist_entered: Notify,
    pub(crate) persist_release: Notify,
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn create_document_dir(&self, document: &Document) -> Result<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk full".to_string()));
        }
        self.created.lock().unwrap().push(document.id().clone());
        Ok(())
    }

    async fn persist_metadata(&self, document: &Document) -> Result<()> {
        if self.hold_persist.load(Ordering::SeqCst) {
            self.persist_entered.notify_one();
            self.persist_release.notified().await;
        }
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(Error::Storage("read-only filesystem".to_string()));
        }
        self.persisted.lock().unwrap().push(document.info());
        Ok(())
    }
}

/// Catalog that counts refreshes and can be told to fail
#[derive(Default)]
pub(crate) struct CountingCatalog {
    pub(crate) refreshes: AtomicUsize,
    pub(crate) fail: AtomicBool,
}

#[async_trait]
impl Catalog for CountingCatalog {
    async fn refresh(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Catalog("index locked".to_string()));
        }
        Ok(())
    }
}

/// Interaction listener that records every callback
#[derive(Default)]
pub(crate) struct RecordingInteraction {
    calls: Mutex<Vec<(Interaction, DocumentId)>>,
}

impl RecordingInteraction {
    pub(crate) fn calls(&self) -> Vec<(Interaction, DocumentId)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, interaction: Interaction, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, d)| *i == interaction && d.as_str() == id)
            .count()
    }
}

impl InteractionListener for RecordingInteraction {
    fn on_download_success(&self, document: &Document) {
        self.calls
            .lock()
            .unwrap()
            .push((Interaction::Succeeded, document.id().clone()));
    }

    fn on_download_fail(&self, document: &Document) {
        self.calls
            .lock()
            .unwrap()
            .push((Interaction::Failed, document.id().clone()));
    }
}

/// A manager wired to scripted collaborators, with handles to inspect them
pub(crate) struct TestHarness {
    pub(crate) manager: DownloadManager,
    pub(crate) fetcher: Arc<ScriptedFetcher>,
    pub(crate) storage: Arc<RecordingStorage>,
    pub(crate) catalog: Arc<CountingCatalog>,
    pub(crate) interactions: Arc<RecordingInteraction>,
}

/// Config with a short poll interval and shutdown timeout for tests
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.queue.poll_interval = Duration::from_millis(20);
    config.queue.shutdown_timeout = Duration::from_secs(2);
    config
}

/// Helper to create a DownloadManager with scripted collaborators.
/// The worker is not started and an interaction recorder is registered.
pub(crate) fn create_test_manager() -> TestHarness {
    create_test_manager_with(test_config())
}

pub(crate) fn create_test_manager_with(config: Config) -> TestHarness {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let storage = Arc::new(RecordingStorage::default());
    let catalog = Arc::new(CountingCatalog::default());
    let interactions = Arc::new(RecordingInteraction::default());

    let collaborators = Collaborators::new(fetcher.clone(), storage.clone(), catalog.clone());
    let manager = DownloadManager::new(config, collaborators).unwrap();
    manager.register_interaction_listener(interactions.clone());

    TestHarness {
        manager,
        fetcher,
        storage,
        catalog,
        interactions,
    }
}

/// A document with `pages` pages
pub(crate) fn document(id: &str, pages: usize) -> Document {
    let pages = (0..pages)
        .map(|i| Page::new(format!("https://pages.test/{id}/{i}.jpg")))
        .collect();
    Document::new(id, format!("Document {id}"), pages)
}

/// Wait (up to 5s) for the first event matching `predicate`
pub(crate) async fn wait_for<F>(events: &mut broadcast::Receiver<Event>, mut predicate: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
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

/// Wait (up to 5s) until nothing is waiting or active
pub(crate) async fn wait_until_idle(manager: &DownloadManager) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = manager.stats().await;
            if stats.waiting == 0 && !stats.active {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for the queue to drain")
}
