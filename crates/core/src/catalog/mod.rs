//! Read access to the external movie catalog.
//!
//! [`CatalogClient`] is the seam between the discovery engine and the
//! metadata service. [`TmdbClient`] talks to TMDB; tests use
//! [`crate::testing::MockCatalog`].

mod taxonomy;
mod tmdb;
mod types;

pub use taxonomy::TaxonomyCache;
pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::HttpError(_) => "http",
            CatalogError::RateLimitExceeded => "rate_limited",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::ApiError { .. } => "api",
            CatalogError::ParseError(_) => "parse",
            CatalogError::NotConfigured(_) => "not_configured",
        }
    }
}

/// Parameterized read queries against the movie catalog.
///
/// Implementations are stateless and safe to call concurrently.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Movies trending today.
    async fn trending(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Currently popular movies.
    async fn popular(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Movies tagged with the given genre.
    async fn by_genre(&self, genre_id: u32) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Full details for a single movie.
    async fn detail(&self, movie_id: u32) -> Result<CatalogItem, CatalogError>;

    /// Free-text title search.
    async fn search(&self, term: &str) -> Result<SearchPage, CatalogError>;

    /// Movies the catalog considers similar to `movie_id`.
    async fn recommendations_for(&self, movie_id: u32) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Every genre the catalog knows about.
    async fn genre_taxonomy(&self) -> Result<Vec<Genre>, CatalogError>;
}
