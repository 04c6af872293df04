use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use super::config::BrowseConfig;
use super::types::GenreSection;
use crate::catalog::{CatalogClient, CatalogError, TaxonomyCache};

/// One page of genre rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenrePage {
    /// 1-based page number actually served.
    pub page: usize,
    pub total_pages: usize,
    pub total_genres: usize,
    pub sections: Vec<GenreSection>,
}

/// Pages through the whole genre taxonomy, a few genres at a time.
pub struct GenreBrowser {
    catalog: Arc<dyn CatalogClient>,
    taxonomy: Arc<TaxonomyCache>,
    config: BrowseConfig,
}

impl GenreBrowser {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        taxonomy: Arc<TaxonomyCache>,
        config: BrowseConfig,
    ) -> Self {
        Self {
            catalog,
            taxonomy,
            config,
        }
    }

    /// Fetch `page` (1-based, clamped into range). A genre whose movies fail
    /// to load yields an empty row with its error set.
    pub async fn page(&self, page: usize) -> Result<GenrePage, CatalogError> {
        let taxonomy = self.taxonomy.get(self.catalog.as_ref()).await?;
        let per_page = self.config.genres_per_page.max(1);
        let total_genres = taxonomy.len();
        let total_pages = total_genres.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        let genres = taxonomy
            .genres()
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned();

        let catalog = self.catalog.as_ref();
        let sections = join_all(genres.map(|genre| async move {
            match catalog.by_genre(genre.id).await {
                Ok(items) => GenreSection {
                    genre,
                    items,
                    error: None,
                },
                Err(e) => {
                    warn!("Genre row failed: genre={}, error={}", genre.id, e);
                    GenreSection {
                        genre,
                        items: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            }
        }))
        .await;

        Ok(GenrePage {
            page,
            total_pages,
            total_genres,
            sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCatalog};

    async fn browser(per_page: usize) -> (Arc<MockCatalog>, GenreBrowser) {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_genres(fixtures::standard_genres()).await;
        let browser = GenreBrowser::new(
            catalog.clone(),
            Arc::new(TaxonomyCache::new()),
            BrowseConfig {
                genres_per_page: per_page,
            },
        );
        (catalog, browser)
    }

    #[tokio::test]
    async fn test_first_page() {
        let (catalog, browser) = browser(4).await;
        catalog
            .set_genre_movies(28, vec![fixtures::movie(1, "Speed")])
            .await;

        let page = browser.page(1).await.unwrap();

        let total = fixtures::standard_genres().len();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_genres, total);
        assert_eq!(page.total_pages, total.div_ceil(4));
        assert_eq!(page.sections.len(), 4);
        assert_eq!(page.sections[0].genre.name, "Action");
        assert_eq!(page.sections[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_page_clamped() {
        let (_, browser) = browser(4).await;

        let last = browser.page(999).await.unwrap();
        assert_eq!(last.page, last.total_pages);
        assert!(!last.sections.is_empty());

        let first = browser.page(0).await.unwrap();
        assert_eq!(first.page, 1);
    }

    #[tokio::test]
    async fn test_failed_genre_keeps_row() {
        let (catalog, browser) = browser(2).await;
        catalog.fail_genre(12).await;

        let page = browser.page(1).await.unwrap();

        assert_eq!(page.sections.len(), 2);
        assert!(page.sections[0].error.is_none());
        assert!(page.sections[1].error.is_some());
        assert!(page.sections[1].items.is_empty());
    }

    #[tokio::test]
    async fn test_taxonomy_failure_is_an_error() {
        let (catalog, browser) = browser(4).await;
        catalog.fail_taxonomy(true).await;

        assert!(browser.page(1).await.is_err());
    }
}
