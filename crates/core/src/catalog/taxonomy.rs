use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use super::{CatalogClient, CatalogError, GenreTaxonomy};

/// Write-once holder for the genre taxonomy.
///
/// The first successful fetch is kept for the lifetime of the cache. A failed
/// fetch leaves the cell empty so a later caller can try again. Concurrent
/// first callers share a single in-flight fetch.
#[derive(Debug, Default)]
pub struct TaxonomyCache {
    cell: OnceCell<Arc<GenreTaxonomy>>,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that never touches the network.
    pub fn preloaded(taxonomy: GenreTaxonomy) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(taxonomy))),
        }
    }

    /// The taxonomy, fetching it from `catalog` on first use.
    pub async fn get(
        &self,
        catalog: &dyn CatalogClient,
    ) -> Result<Arc<GenreTaxonomy>, CatalogError> {
        let taxonomy = self
            .cell
            .get_or_try_init(|| async {
                let genres = catalog.genre_taxonomy().await?;
                debug!("Genre taxonomy loaded: {} genres", genres.len());
                Ok::<_, CatalogError>(Arc::new(GenreTaxonomy::from_genres(genres)))
            })
            .await?;
        Ok(Arc::clone(taxonomy))
    }

    /// The taxonomy if it has already been loaded.
    pub fn cached(&self) -> Option<Arc<GenreTaxonomy>> {
        self.cell.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Genre;
    use crate::testing::{fixtures, MockCatalog};

    #[tokio::test]
    async fn test_taxonomy_fetched_once() {
        let catalog = MockCatalog::new();
        catalog.set_genres(fixtures::standard_genres()).await;
        let cache = TaxonomyCache::new();

        let first = cache.get(&catalog).await.unwrap();
        let second = cache.get(&catalog).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.taxonomy_fetches().await, 1);
        assert_eq!(first.name(28), Some("Action"));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let catalog = MockCatalog::new();
        catalog.set_genres(fixtures::standard_genres()).await;
        catalog.fail_taxonomy(true).await;
        let cache = TaxonomyCache::new();

        assert!(cache.get(&catalog).await.is_err());
        assert!(cache.cached().is_none());

        catalog.fail_taxonomy(false).await;
        let taxonomy = cache.get(&catalog).await.unwrap();
        assert_eq!(taxonomy.name(12), Some("Adventure"));
        assert_eq!(catalog.taxonomy_fetches().await, 2);
    }

    #[tokio::test]
    async fn test_preloaded_skips_network() {
        let catalog = MockCatalog::new();
        let cache = TaxonomyCache::preloaded(GenreTaxonomy::from_genres(vec![Genre {
            id: 99,
            name: "Documentary".to_string(),
        }]));

        let taxonomy = cache.get(&catalog).await.unwrap();
        assert_eq!(taxonomy.name(99), Some("Documentary"));
        assert_eq!(catalog.taxonomy_fetches().await, 0);
    }
}
