//! Per-user preference signals: genre interests, favorites, watch history
//! and past searches.

mod sqlite;
mod types;

pub use sqlite::SqliteSignalStore;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::UserIdentity;

#[derive(Debug, Error)]
pub enum SignalStoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Signal store unavailable: {0}")]
    Unavailable(String),
}

/// Reads and writes a user's preference signals.
///
/// List reads return the most recent entry first, except interests, which
/// keep the order the user picked them in.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Genre ids the user said they are interested in.
    async fn interest_genres(&self, user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError>;

    /// Movie ids the user has favorited.
    async fn favorited_movie_ids(&self, user: &UserIdentity)
        -> Result<Vec<u32>, SignalStoreError>;

    /// Movie ids the user has watched.
    async fn watched_movie_ids(&self, user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError>;

    /// Raw search terms, possibly with repeats.
    async fn recent_searches(&self, user: &UserIdentity) -> Result<Vec<String>, SignalStoreError>;

    /// Replace the user's interest set.
    async fn replace_interests(
        &self,
        user: &UserIdentity,
        genre_ids: &[u32],
    ) -> Result<(), SignalStoreError>;

    /// Record a movie interaction. `Favorited` replaces any earlier favorite
    /// of the same movie; `Unfavorited` removes it.
    async fn record_interaction(
        &self,
        user: &UserIdentity,
        interaction: &Interaction,
    ) -> Result<(), SignalStoreError>;

    /// Append a term to the search history.
    async fn record_search(&self, user: &UserIdentity, term: &str) -> Result<(), SignalStoreError>;

    /// Whether an interaction of this kind exists for the movie.
    async fn has_interaction(
        &self,
        user: &UserIdentity,
        movie_id: u32,
        action: InteractionAction,
    ) -> Result<bool, SignalStoreError>;

    /// All four signal lists, read concurrently.
    async fn profile(&self, user: &UserIdentity) -> Result<SignalProfile, SignalStoreError> {
        let (interest_genre_ids, favorited_movie_ids, watched_movie_ids, recent_search_terms) =
            tokio::try_join!(
                self.interest_genres(user),
                self.favorited_movie_ids(user),
                self.watched_movie_ids(user),
                self.recent_searches(user),
            )?;

        Ok(SignalProfile {
            interest_genre_ids,
            favorited_movie_ids,
            watched_movie_ids,
            recent_search_terms,
        })
    }
}
