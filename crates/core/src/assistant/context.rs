use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{truncate_text, CatalogClient, CatalogItem, TaxonomyCache, UNKNOWN_GENRE};
use crate::identity::UserIdentity;
use crate::signals::SignalStore;

const SEED_MOVIES: usize = 3;
const RECENT_SEARCHES: usize = 5;
const HIGHLIGHTS: usize = 5;
const SEED_OVERVIEW_CHARS: usize = 200;
const HIGHLIGHT_OVERVIEW_CHARS: usize = 150;

/// Context used when there is no signed-in user.
pub const GENERAL_CONTEXT: &str = "General movie database context.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: u32,
    pub title: String,
    pub overview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub vote_average: f32,
}

impl MovieSummary {
    fn from_item(item: &CatalogItem, overview_chars: usize) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            overview: truncate_text(&item.overview, overview_chars),
            release_date: item.release_date.clone(),
            vote_average: item.vote_average,
        }
    }
}

/// A user's taste profile plus what is currently hot, ready to hand to a
/// language model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssistantContext {
    pub interests: Vec<String>,
    pub liked_movies: Vec<MovieSummary>,
    pub watched_movies: Vec<MovieSummary>,
    pub recent_searches: Vec<String>,
    pub trending: Vec<MovieSummary>,
    pub popular: Vec<MovieSummary>,
}

impl AssistantContext {
    /// Gather the context for `user`. Every source degrades to empty on
    /// failure.
    pub async fn build(
        user: &UserIdentity,
        catalog: &dyn CatalogClient,
        signals: &dyn SignalStore,
        taxonomy: &TaxonomyCache,
    ) -> Self {
        let (interests, liked, watched, searches, trending, popular) = tokio::join!(
            signals.interest_genres(user),
            signals.favorited_movie_ids(user),
            signals.watched_movie_ids(user),
            signals.recent_searches(user),
            catalog.trending(),
            catalog.popular(),
        );
        let interests = or_empty(interests, "interest genres");
        let liked = or_empty(liked, "favorited movies");
        let watched = or_empty(watched, "watched movies");
        let searches = or_empty(searches, "recent searches");
        let trending = or_empty(trending, "trending movies");
        let popular = or_empty(popular, "popular movies");

        let names = async {
            if interests.is_empty() {
                return Vec::new();
            }
            let taxonomy = taxonomy
                .get(catalog)
                .await
                .map_err(|e| warn!("Assistant context: genre taxonomy unavailable: {}", e))
                .ok();
            interests
                .iter()
                .map(|&id| {
                    taxonomy
                        .as_ref()
                        .map_or(UNKNOWN_GENRE, |t| t.display_name(id))
                        .to_string()
                })
                .collect::<Vec<String>>()
        };
        let (interests, liked_movies, watched_movies) = tokio::join!(
            names,
            seed_details(catalog, &liked),
            seed_details(catalog, &watched),
        );

        let context = Self {
            interests,
            liked_movies,
            watched_movies,
            recent_searches: searches.into_iter().take(RECENT_SEARCHES).collect(),
            trending: highlights(&trending),
            popular: highlights(&popular),
        };
        debug!(
            "Assistant context built: interests={}, liked={}, watched={}, searches={}",
            context.interests.len(),
            context.liked_movies.len(),
            context.watched_movies.len(),
            context.recent_searches.len()
        );
        context
    }

    pub fn to_json(&self) -> String {
        // Plain data; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn or_empty<T, E: std::fmt::Display>(result: Result<Vec<T>, E>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Assistant context: failed to load {}: {}", what, e);
        Vec::new()
    })
}

/// Details for the first few seed movies; lookups that fail are skipped.
async fn seed_details(catalog: &dyn CatalogClient, ids: &[u32]) -> Vec<MovieSummary> {
    join_all(ids.iter().take(SEED_MOVIES).map(|&id| catalog.detail(id)))
        .await
        .into_iter()
        .filter_map(|result| match result {
            Ok(item) => Some(MovieSummary::from_item(&item, SEED_OVERVIEW_CHARS)),
            Err(e) => {
                warn!("Assistant context: movie lookup failed: {}", e);
                None
            }
        })
        .collect()
}

fn highlights(items: &[CatalogItem]) -> Vec<MovieSummary> {
    items
        .iter()
        .take(HIGHLIGHTS)
        .map(|item| MovieSummary::from_item(item, HIGHLIGHT_OVERVIEW_CHARS))
        .collect()
}
