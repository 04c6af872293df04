use serde::{Deserialize, Serialize};

/// Limits applied while building recommendation sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Favorited movies used as "because you liked" seeds.
    #[serde(default = "default_favorites_limit")]
    pub favorites_limit: usize,
    /// Watched movies used as "because you watched" seeds.
    #[serde(default = "default_watched_limit")]
    pub watched_limit: usize,
    /// Distinct past search terms replayed.
    #[serde(default = "default_search_terms_limit")]
    pub search_terms_limit: usize,
    /// Items kept per replayed search.
    #[serde(default = "default_search_results_limit")]
    pub search_results_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            favorites_limit: default_favorites_limit(),
            watched_limit: default_watched_limit(),
            search_terms_limit: default_search_terms_limit(),
            search_results_limit: default_search_results_limit(),
        }
    }
}

fn default_favorites_limit() -> usize {
    3
}

fn default_watched_limit() -> usize {
    3
}

fn default_search_terms_limit() -> usize {
    5
}

fn default_search_results_limit() -> usize {
    10
}

/// Genre browsing pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_genres_per_page")]
    pub genres_per_page: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            genres_per_page: default_genres_per_page(),
        }
    }
}

fn default_genres_per_page() -> usize {
    4
}
