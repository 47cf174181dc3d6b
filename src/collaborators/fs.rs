//! Filesystem-backed document storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::traits::Storage;
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::{Document, DocumentId, DocumentInfo};

/// Extension used when a page URL carries none
const DEFAULT_PAGE_EXTENSION: &str = "jpg";

/// Stores each document in its own directory under a root
///
/// Layout:
///
/// ```text
/// <root>/<document id>/0000.jpg
/// <root>/<document id>/0001.jpg
/// <root>/<document id>/metadata.json
/// ```
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
    metadata_file: String,
}

impl FsStorage {
    /// Create storage rooted at `root` with the default metadata file name
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metadata_file: StorageConfig::default().metadata_file,
        }
    }

    /// Create storage from configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            metadata_file: config.metadata_file.clone(),
        }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a document's pages and metadata
    pub fn document_dir(&self, id: &DocumentId) -> PathBuf {
        self.root.join(dir_name(id))
    }

    /// Path of a document's metadata file
    pub fn metadata_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(&self.metadata_file)
    }

    /// Path a page is stored at
    ///
    /// The extension is taken from the page URL's path, falling back to `jpg`.
    pub fn page_path(&self, document: &Document, index: usize) -> Result<PathBuf> {
        let page = document.pages().get(index).ok_or_else(|| Error::Fetch {
            document: document.id().clone(),
            page: index,
            message: format!("document has only {} pages", document.page_count()),
        })?;
        let url = url::Url::parse(&page.url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", page.url, e)))?;

        let extension = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.len() <= 5)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_PAGE_EXTENSION.to_string());

        Ok(self
            .document_dir(document.id())
            .join(format!("{index:04}.{extension}")))
    }

    /// Read back a document's persisted metadata, if any
    pub async fn load_metadata(&self, id: &DocumentId) -> Result<Option<DocumentInfo>> {
        let path = self.metadata_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn create_document_dir(&self, document: &Document) -> Result<()> {
        let dir = self.document_dir(document.id());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!(
                "failed to create document directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        tracing::debug!(document_id = %document.id(), dir = %dir.display(), "Document directory ready");
        Ok(())
    }

    async fn persist_metadata(&self, document: &Document) -> Result<()> {
        let path = self.metadata_path(document.id());
        let json = serde_json::to_vec_pretty(&document.info())?;

        // write-then-rename so readers never see a truncated file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(document_id = %document.id(), path = %path.display(), "Metadata persisted");
        Ok(())
    }
}

/// Directory name for a document id, safe as a single path component
fn dir_name(id: &DocumentId) -> String {
    let name: String = id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        format!("_{}", name)
    } else {
        name
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Page, Status};

    fn doc(urls: &[&str]) -> Document {
        Document::new(
            "book-1",
            "Book",
            urls.iter().map(|u| Page::new(*u)).collect(),
        )
    }

    #[test]
    fn page_path_uses_url_extension_and_zero_padded_index() {
        let storage = FsStorage::new("/lib");
        let d = doc(&["https://cdn.example.com/a/001.PNG", "https://cdn.example.com/a/002"]);

        assert_eq!(
            storage.page_path(&d, 0).unwrap(),
            PathBuf::from("/lib/book-1/0000.png")
        );
        assert_eq!(
            storage.page_path(&d, 1).unwrap(),
            PathBuf::from("/lib/book-1/0001.jpg"),
            "missing extension falls back to jpg"
        );
    }

    #[test]
    fn page_path_ignores_query_string() {
        let storage = FsStorage::new("/lib");
        let d = doc(&["https://cdn.example.com/p.webp?token=abc.def"]);

        assert_eq!(
            storage.page_path(&d, 0).unwrap(),
            PathBuf::from("/lib/book-1/0000.webp")
        );
    }

    #[test]
    fn page_path_rejects_out_of_range_index() {
        let storage = FsStorage::new("/lib");
        let d = doc(&["https://cdn.example.com/p.jpg"]);

        assert!(matches!(
            storage.page_path(&d, 5),
            Err(Error::Fetch { page: 5, .. })
        ));
    }

    #[test]
    fn page_path_rejects_unparsable_url() {
        let storage = FsStorage::new("/lib");
        let d = doc(&["not a url"]);

        assert!(matches!(storage.page_path(&d, 0), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn dir_name_neutralizes_path_separators() {
        assert_eq!(dir_name(&DocumentId::new("../etc/passwd")), ".._etc_passwd");
        assert_eq!(dir_name(&DocumentId::new("..")), "_..");
        assert_eq!(dir_name(&DocumentId::new("")), "_");
        assert_eq!(dir_name(&DocumentId::new("abc-123_x.y")), "abc-123_x.y");
    }

    #[tokio::test]
    async fn persist_then_load_metadata() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path());
        let d = doc(&["https://cdn.example.com/p.jpg"]);
        d.finish(Status::Downloaded);

        storage.create_document_dir(&d).await.unwrap();
        storage.persist_metadata(&d).await.unwrap();

        let info = storage.load_metadata(d.id()).await.unwrap().unwrap();
        assert_eq!(info.id, *d.id());
        assert_eq!(info.status, Status::Downloaded);
        assert!(
            !storage.metadata_path(d.id()).with_extension("json.tmp").exists(),
            "temp file should be renamed away"
        );
    }

    #[tokio::test]
    async fn load_metadata_returns_none_when_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path());

        let info = storage
            .load_metadata(&DocumentId::new("missing"))
            .await
            .unwrap();

        assert!(info.is_none());
    }

    #[tokio::test]
    async fn persist_without_directory_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().join("nope"));
        let d = doc(&["https://cdn.example.com/p.jpg"]);

        assert!(storage.persist_metadata(&d).await.is_err());
    }
}
