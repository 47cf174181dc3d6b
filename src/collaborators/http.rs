//! HTTP page fetcher writing into [`FsStorage`] layout

use async_trait::async_trait;

use super::fs::FsStorage;
use super::traits::PageFetcher;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::types::{Document, PageOutcome};

/// Downloads page images over HTTP(S)
///
/// Network failures and non-success HTTP statuses are reported as
/// [`PageOutcome::Skipped`] so the rest of the document is still attempted.
/// A malformed page URL or a failed disk write is an `Err` and aborts the
/// document.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    layout: FsStorage,
}

impl HttpPageFetcher {
    /// Build a fetcher with a client configured from `config`
    pub fn new(config: &HttpConfig, layout: FsStorage) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, layout })
    }

    /// Build a fetcher around an existing client
    pub fn with_client(client: reqwest::Client, layout: FsStorage) -> Self {
        Self { client, layout }
    }

    /// Storage layout pages are written into
    pub fn layout(&self) -> &FsStorage {
        &self.layout
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn is_page_present(&self, document: &Document, index: usize) -> Result<bool> {
        let path = self.layout.page_path(document, index)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn fetch_page(&self, document: &Document, index: usize) -> Result<PageOutcome> {
        let destination = self.layout.page_path(document, index)?;
        // page_path already validated the index and URL
        let url = &document.pages()[index].url;

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    document_id = %document.id(),
                    page = index,
                    error = %e,
                    "Page request failed"
                );
                return Ok(PageOutcome::Skipped);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                document_id = %document.id(),
                page = index,
                status = status.as_u16(),
                "Page request returned non-success status"
            );
            return Ok(PageOutcome::Skipped);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::warn!(document_id = %document.id(), page = index, "Page body was empty");
                return Ok(PageOutcome::Skipped);
            }
            Err(e) => {
                tracing::warn!(
                    document_id = %document.id(),
                    page = index,
                    error = %e,
                    "Failed to read page body"
                );
                return Ok(PageOutcome::Skipped);
            }
        };

        let partial = destination.with_extension("part");
        let write = async {
            tokio::fs::write(&partial, &bytes).await?;
            tokio::fs::rename(&partial, &destination).await
        };
        write.await.map_err(|e| Error::Fetch {
            document: document.id().clone(),
            page: index,
            message: format!("failed to write '{}': {}", destination.display(), e),
        })?;

        tracing::debug!(
            document_id = %document.id(),
            page = index,
            bytes = bytes.len(),
            "Page stored"
        );
        Ok(PageOutcome::Fetched)
    }
}
