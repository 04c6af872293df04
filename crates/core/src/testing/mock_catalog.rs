//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::catalog::{CatalogClient, CatalogError, CatalogItem, Genre, SearchPage};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Trending,
    Popular,
    ByGenre { genre_id: u32 },
    Detail { movie_id: u32 },
    /// `at` is taken from the tokio clock, so paused-time tests can check
    /// debounce timing.
    Search { term: String, at: Instant },
    RecommendationsFor { movie_id: u32 },
    GenreTaxonomy,
}

/// Failure switches, keyed by what should fail.
#[derive(Debug, Default)]
struct Failures {
    trending: bool,
    popular: bool,
    taxonomy: bool,
    genres: HashSet<u32>,
    details: HashSet<u32>,
    searches: HashSet<String>,
}

/// Mock implementation of the CatalogClient trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable lists, details and search pages
/// - Track queries for assertions
/// - Fail individual units or the next call
/// - Delay specific searches
///
/// Unknown genres, searches and similar-movie lookups return empty results;
/// unknown movie details return `NotFound`.
#[derive(Debug)]
pub struct MockCatalog {
    trending: Arc<RwLock<Vec<CatalogItem>>>,
    popular: Arc<RwLock<Vec<CatalogItem>>>,
    genres: Arc<RwLock<Vec<Genre>>>,
    genre_movies: Arc<RwLock<HashMap<u32, Vec<CatalogItem>>>>,
    movies: Arc<RwLock<HashMap<u32, CatalogItem>>>,
    similar: Arc<RwLock<HashMap<u32, Vec<CatalogItem>>>>,
    search_results: Arc<RwLock<HashMap<String, Vec<CatalogItem>>>>,
    search_delays: Arc<RwLock<HashMap<String, Duration>>>,
    failures: Arc<RwLock<Failures>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            trending: Arc::new(RwLock::new(Vec::new())),
            popular: Arc::new(RwLock::new(Vec::new())),
            genres: Arc::new(RwLock::new(Vec::new())),
            genre_movies: Arc::new(RwLock::new(HashMap::new())),
            movies: Arc::new(RwLock::new(HashMap::new())),
            similar: Arc::new(RwLock::new(HashMap::new())),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            search_delays: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(Failures::default())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Content Configuration
    // =========================================================================

    pub async fn set_trending(&self, items: Vec<CatalogItem>) {
        *self.trending.write().await = items;
    }

    pub async fn set_popular(&self, items: Vec<CatalogItem>) {
        *self.popular.write().await = items;
    }

    pub async fn set_genres(&self, genres: Vec<Genre>) {
        *self.genres.write().await = genres;
    }

    pub async fn set_genre_movies(&self, genre_id: u32, items: Vec<CatalogItem>) {
        self.genre_movies.write().await.insert(genre_id, items);
    }

    /// Add a movie that `detail` can find.
    pub async fn add_movie(&self, movie: CatalogItem) {
        self.movies.write().await.insert(movie.id, movie);
    }

    pub async fn set_similar(&self, movie_id: u32, items: Vec<CatalogItem>) {
        self.similar.write().await.insert(movie_id, items);
    }

    pub async fn set_search_results(&self, term: &str, items: Vec<CatalogItem>) {
        self.search_results
            .write()
            .await
            .insert(term.to_string(), items);
    }

    /// Make searches for `term` take `delay` before answering.
    pub async fn set_search_delay(&self, term: &str, delay: Duration) {
        self.search_delays
            .write()
            .await
            .insert(term.to_string(), delay);
    }

    // =========================================================================
    // Failure Injection
    // =========================================================================

    pub async fn fail_trending(&self, fail: bool) {
        self.failures.write().await.trending = fail;
    }

    pub async fn fail_popular(&self, fail: bool) {
        self.failures.write().await.popular = fail;
    }

    pub async fn fail_taxonomy(&self, fail: bool) {
        self.failures.write().await.taxonomy = fail;
    }

    pub async fn fail_genre(&self, genre_id: u32) {
        self.failures.write().await.genres.insert(genre_id);
    }

    pub async fn fail_detail(&self, movie_id: u32) {
        self.failures.write().await.details.insert(movie_id);
    }

    pub async fn fail_search(&self, term: &str) {
        self.failures
            .write()
            .await
            .searches
            .insert(term.to_string());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Search terms in the order they were issued.
    pub async fn search_terms(&self) -> Vec<String> {
        self.search_log()
            .await
            .into_iter()
            .map(|(term, _)| term)
            .collect()
    }

    /// Search terms with the instant each search was issued.
    pub async fn search_log(&self) -> Vec<(String, Instant)> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Search { term, at } => Some((term.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    /// How many times the genre list was requested.
    pub async fn taxonomy_fetches(&self) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| matches!(q, RecordedCatalogQuery::GenreTaxonomy))
            .count()
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }
}

fn injected(what: impl std::fmt::Display) -> CatalogError {
    CatalogError::ApiError {
        status: 500,
        message: format!("injected failure: {}", what),
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn trending(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::Trending).await;

        if self.failures.read().await.trending {
            return Err(injected("trending"));
        }
        Ok(self.trending.read().await.clone())
    }

    async fn popular(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::Popular).await;

        if self.failures.read().await.popular {
            return Err(injected("popular"));
        }
        Ok(self.popular.read().await.clone())
    }

    async fn by_genre(&self, genre_id: u32) -> Result<Vec<CatalogItem>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::ByGenre { genre_id }).await;

        if self.failures.read().await.genres.contains(&genre_id) {
            return Err(injected(format!("genre {}", genre_id)));
        }
        Ok(self
            .genre_movies
            .read()
            .await
            .get(&genre_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn detail(&self, movie_id: u32) -> Result<CatalogItem, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::Detail { movie_id }).await;

        if self.failures.read().await.details.contains(&movie_id) {
            return Err(injected(format!("movie {}", movie_id)));
        }
        self.movies
            .read()
            .await
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Movie {} not found", movie_id)))
    }

    async fn search(&self, term: &str) -> Result<SearchPage, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::Search {
            term: term.to_string(),
            at: Instant::now(),
        })
        .await;

        let delay = self.search_delays.read().await.get(term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.read().await.searches.contains(term) {
            return Err(injected(format!("search {:?}", term)));
        }
        let items = self
            .search_results
            .read()
            .await
            .get(term)
            .cloned()
            .unwrap_or_default();
        Ok(SearchPage {
            total_count: items.len() as u32,
            items,
        })
    }

    async fn recommendations_for(&self, movie_id: u32) -> Result<Vec<CatalogItem>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::RecommendationsFor { movie_id })
            .await;

        Ok(self
            .similar
            .read()
            .await
            .get(&movie_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn genre_taxonomy(&self) -> Result<Vec<Genre>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedCatalogQuery::GenreTaxonomy).await;

        if self.failures.read().await.taxonomy {
            return Err(injected("genre taxonomy"));
        }
        Ok(self.genres.read().await.clone())
    }
}
