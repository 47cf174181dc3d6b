//! No-op catalog for embedders without a local index

use super::traits::Catalog;
use async_trait::async_trait;

/// Catalog that has nothing to refresh
///
/// Used when the embedding application keeps no local index of downloaded
/// documents. `refresh` always succeeds.
///
/// # Examples
///
/// ```
/// use page_dl::collaborators::{Catalog, NoOpCatalog};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// NoOpCatalog.refresh().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpCatalog;

#[async_trait]
impl Catalog for NoOpCatalog {
    async fn refresh(&self) -> crate::Result<()> {
        tracing::debug!("Catalog refresh requested (no-op catalog)");
        Ok(())
    }
}
