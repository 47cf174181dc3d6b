//! Capabilities the download worker depends on
//!
//! The queue itself never touches the network or the disk. Everything it
//! needs from the outside world goes through three traits:
//!
//! - [`PageFetcher`]: check for and fetch a single page
//! - [`Storage`]: create a document's directory and persist its metadata
//! - [`Catalog`]: refresh the local index after a successful download
//!
//! Default implementations are provided for the common case:
//!
//! - [`HttpPageFetcher`]: fetches page URLs with `reqwest`
//! - [`FsStorage`]: one directory per document plus a JSON metadata file
//! - [`NoOpCatalog`]: nothing to refresh
//!
//! ## Usage
//!
//! ```no_run
//! use page_dl::{Config, DownloadManager};
//! use page_dl::collaborators::Collaborators;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let collaborators = Collaborators::from_config(&config)?;
//! let manager = DownloadManager::new(config, collaborators)?;
//! # let _ = manager;
//! # Ok(())
//! # }
//! ```

mod fs;
mod http;
mod noop;
mod traits;

pub use fs::FsStorage;
pub use http::HttpPageFetcher;
pub use noop::NoOpCatalog;
pub use traits::{Catalog, Collaborators, PageFetcher, Storage};

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

impl Collaborators {
    /// Default adapters: HTTP fetching into filesystem storage, no catalog
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = FsStorage::from_config(&config.storage);
        let fetcher = HttpPageFetcher::new(&config.http, storage.clone())?;

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(storage),
            Arc::new(NoOpCatalog),
        ))
    }
}
