//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CatalogClient, CatalogError, CatalogItem, Genre, SearchPage};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const POSTER_SIZE: &str = "w500";

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters/backdrops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let image_base_url = config
            .image_base_url
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API root requests are issued against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full poster URL for a poster path returned by the API.
    pub fn poster_url(&self, poster_path: &str) -> String {
        format!("{}/{}{}", self.image_base_url, POSTER_SIZE, poster_path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        resource: &str,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("TMDB request: path='{}', params={:?}", path, params);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .query(params)
            .send()
            .await?;

        let response = check_status(response, resource).await?;

        response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse {} response: {}", resource, e))
        })
    }

    async fn movie_list(
        &self,
        path: &str,
        params: &[(&str, String)],
        resource: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let page: TmdbPagedResponse = self.get_json(path, params, resource).await?;
        Ok(page.results.into_iter().map(CatalogItem::from).collect())
    }
}

async fn check_status(response: Response, resource: &str) -> Result<Response, CatalogError> {
    let status = response.status();
    if status == 401 {
        return Err(CatalogError::NotConfigured(
            "Invalid TMDB API key".to_string(),
        ));
    }
    if status == 404 {
        return Err(CatalogError::NotFound(resource.to_string()));
    }
    if status == 429 {
        return Err(CatalogError::RateLimitExceeded);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

#[async_trait]
impl CatalogClient for TmdbClient {
    async fn trending(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        self.movie_list("/trending/movie/day", &[], "trending movies")
            .await
    }

    async fn popular(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        self.movie_list("/movie/popular", &[], "popular movies")
            .await
    }

    async fn by_genre(&self, genre_id: u32) -> Result<Vec<CatalogItem>, CatalogError> {
        self.movie_list(
            "/discover/movie",
            &[("with_genres", genre_id.to_string())],
            &format!("genre {}", genre_id),
        )
        .await
    }

    async fn detail(&self, movie_id: u32) -> Result<CatalogItem, CatalogError> {
        let details: TmdbMovieDetails = self
            .get_json(
                &format!("/movie/{}", movie_id),
                &[],
                &format!("movie {}", movie_id),
            )
            .await?;
        Ok(details.into())
    }

    async fn search(&self, term: &str) -> Result<SearchPage, CatalogError> {
        let page: TmdbPagedResponse = self
            .get_json(
                "/search/movie",
                &[("query", term.to_string())],
                "movie search",
            )
            .await?;
        Ok(page.into())
    }

    async fn recommendations_for(&self, movie_id: u32) -> Result<Vec<CatalogItem>, CatalogError> {
        self.movie_list(
            &format!("/movie/{}/recommendations", movie_id),
            &[],
            &format!("recommendations for movie {}", movie_id),
        )
        .await
    }

    async fn genre_taxonomy(&self) -> Result<Vec<Genre>, CatalogError> {
        let (movie, tv) = tokio::try_join!(
            self.get_json::<TmdbGenreList>("/genre/movie/list", &[], "movie genres"),
            self.get_json::<TmdbGenreList>("/genre/tv/list", &[], "tv genres"),
        )?;

        // Movie names come first so they win when ids overlap.
        Ok(movie
            .genres
            .into_iter()
            .chain(tv.genres)
            .map(Genre::from)
            .collect())
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPagedResponse {
    #[serde(default)]
    results: Vec<TmdbMovieResult>,
    #[serde(default)]
    total_results: u32,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: u32,
    title: String,
    overview: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    genre_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: u32,
    title: String,
    overview: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: u32,
    name: String,
}

// ============================================================================
// Conversions
// ============================================================================

/// TMDB sends "" for missing dates and images.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn vote(value: Option<f32>) -> f32 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0)
}

impl From<TmdbMovieResult> for CatalogItem {
    fn from(r: TmdbMovieResult) -> Self {
        Self {
            id: r.id,
            title: r.title,
            overview: r.overview.unwrap_or_default(),
            release_date: non_empty(r.release_date),
            poster_path: non_empty(r.poster_path),
            backdrop_path: non_empty(r.backdrop_path),
            vote_average: vote(r.vote_average),
            genre_ids: r.genre_ids,
        }
    }
}

impl From<TmdbMovieDetails> for CatalogItem {
    fn from(d: TmdbMovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            overview: d.overview.unwrap_or_default(),
            release_date: non_empty(d.release_date),
            poster_path: non_empty(d.poster_path),
            backdrop_path: non_empty(d.backdrop_path),
            vote_average: vote(d.vote_average),
            genre_ids: d.genres.into_iter().map(|g| g.id).collect(),
        }
    }
}

impl From<TmdbPagedResponse> for SearchPage {
    fn from(page: TmdbPagedResponse) -> Self {
        let items: Vec<CatalogItem> = page.results.into_iter().map(CatalogItem::from).collect();
        // Some endpoints omit total_results.
        let total_count = page.total_results.max(items.len() as u32);
        Self { items, total_count }
    }
}

impl From<TmdbGenre> for Genre {
    fn from(g: TmdbGenre) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> TmdbConfig {
        TmdbConfig {
            api_key: api_key.to_string(),
            base_url: None,
            image_base_url: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = TmdbClient::new(config(""));
        assert!(matches!(result, Err(CatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_base_url_defaults_and_trims() {
        let client = TmdbClient::new(config("key")).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let mut custom = config("key");
        custom.base_url = Some("http://localhost:8080/3/".to_string());
        let client = TmdbClient::new(custom).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/3");
    }

    #[test]
    fn test_poster_url() {
        let client = TmdbClient::new(config("key")).unwrap();
        assert_eq!(
            client.poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_movie_result_conversion_normalizes_empty_fields() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "overview": "A computer hacker...",
            "release_date": "",
            "poster_path": "/poster.jpg",
            "backdrop_path": "",
            "vote_average": 8.2,
            "genre_ids": [28, 878]
        }"#;
        let result: TmdbMovieResult = serde_json::from_str(json).unwrap();

        let item: CatalogItem = result.into();
        assert_eq!(item.id, 603);
        assert!(item.release_date.is_none());
        assert!(item.backdrop_path.is_none());
        assert_eq!(item.poster_path.as_deref(), Some("/poster.jpg"));
        assert_eq!(item.genre_ids, vec![28, 878]);
    }

    #[test]
    fn test_movie_details_conversion() {
        let json = r#"{
            "id": 155,
            "title": "The Dark Knight",
            "overview": null,
            "release_date": "2008-07-16",
            "poster_path": null,
            "backdrop_path": null,
            "vote_average": null,
            "genres": [{"id": 18, "name": "Drama"}, {"id": 28, "name": "Action"}]
        }"#;
        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();

        let item: CatalogItem = details.into();
        assert_eq!(item.year(), Some(2008));
        assert_eq!(item.overview, "");
        assert_eq!(item.vote_average, 0.0);
        assert_eq!(item.genre_ids, vec![18, 28]);
    }

    #[test]
    fn test_search_page_total_count() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 1, "title": "Batman"}],
            "total_results": 137
        }"#;
        let page: TmdbPagedResponse = serde_json::from_str(json).unwrap();
        let page: SearchPage = page.into();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 137);

        let json = r#"{"results": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]}"#;
        let page: TmdbPagedResponse = serde_json::from_str(json).unwrap();
        let page: SearchPage = page.into();
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_negative_vote_clamped() {
        assert_eq!(vote(Some(-1.0)), 0.0);
        assert_eq!(vote(Some(f32::NAN)), 0.0);
        assert_eq!(vote(Some(6.5)), 6.5);
    }
}
