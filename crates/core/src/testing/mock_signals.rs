//! Mock signal store for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::identity::UserIdentity;
use crate::signals::{Interaction, InteractionAction, SignalStore, SignalStoreError};

#[derive(Debug, Default)]
struct Signals {
    interests: Vec<u32>,
    favorites: Vec<u32>,
    watched: Vec<u32>,
    searches: Vec<String>,
}

#[derive(Debug, Default)]
struct Failures {
    interests: bool,
    favorites: bool,
    watched: bool,
    searches: bool,
}

/// Mock implementation of the SignalStore trait.
///
/// Holds one profile shared by every user. Lists are returned exactly as
/// configured, most recent first. Writes update the profile, and searches
/// are also kept in a separate log for assertions.
#[derive(Debug, Default)]
pub struct MockSignalStore {
    signals: Arc<RwLock<Signals>>,
    failures: Arc<RwLock<Failures>>,
    recorded_searches: Arc<RwLock<Vec<String>>>,
    reads: Arc<RwLock<usize>>,
}

impl MockSignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn set_interests(&self, genre_ids: Vec<u32>) {
        self.signals.write().await.interests = genre_ids;
    }

    pub async fn set_favorites(&self, movie_ids: Vec<u32>) {
        self.signals.write().await.favorites = movie_ids;
    }

    pub async fn set_watched(&self, movie_ids: Vec<u32>) {
        self.signals.write().await.watched = movie_ids;
    }

    pub async fn set_searches(&self, terms: Vec<String>) {
        self.signals.write().await.searches = terms;
    }

    pub async fn fail_interests(&self, fail: bool) {
        self.failures.write().await.interests = fail;
    }

    pub async fn fail_favorites(&self, fail: bool) {
        self.failures.write().await.favorites = fail;
    }

    pub async fn fail_watched(&self, fail: bool) {
        self.failures.write().await.watched = fail;
    }

    pub async fn fail_searches(&self, fail: bool) {
        self.failures.write().await.searches = fail;
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Number of list reads served, failed ones included.
    pub async fn read_count(&self) -> usize {
        *self.reads.read().await
    }

    /// Terms passed to `record_search`, oldest first.
    pub async fn recorded_searches(&self) -> Vec<String> {
        self.recorded_searches.read().await.clone()
    }

    async fn count_read(&self) {
        *self.reads.write().await += 1;
    }
}

fn injected(what: &str) -> SignalStoreError {
    SignalStoreError::Unavailable(format!("injected failure: {}", what))
}

#[async_trait]
impl SignalStore for MockSignalStore {
    async fn interest_genres(&self, _user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError> {
        self.count_read().await;
        if self.failures.read().await.interests {
            return Err(injected("interests"));
        }
        Ok(self.signals.read().await.interests.clone())
    }

    async fn favorited_movie_ids(
        &self,
        _user: &UserIdentity,
    ) -> Result<Vec<u32>, SignalStoreError> {
        self.count_read().await;
        if self.failures.read().await.favorites {
            return Err(injected("favorites"));
        }
        Ok(self.signals.read().await.favorites.clone())
    }

    async fn watched_movie_ids(&self, _user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError> {
        self.count_read().await;
        if self.failures.read().await.watched {
            return Err(injected("watched"));
        }
        Ok(self.signals.read().await.watched.clone())
    }

    async fn recent_searches(&self, _user: &UserIdentity) -> Result<Vec<String>, SignalStoreError> {
        self.count_read().await;
        if self.failures.read().await.searches {
            return Err(injected("searches"));
        }
        Ok(self.signals.read().await.searches.clone())
    }

    async fn replace_interests(
        &self,
        _user: &UserIdentity,
        genre_ids: &[u32],
    ) -> Result<(), SignalStoreError> {
        self.signals.write().await.interests = genre_ids.to_vec();
        Ok(())
    }

    async fn record_interaction(
        &self,
        _user: &UserIdentity,
        interaction: &Interaction,
    ) -> Result<(), SignalStoreError> {
        interaction.validate()?;
        let mut signals = self.signals.write().await;
        let id = interaction.movie_id;
        match interaction.action {
            InteractionAction::Favorited => {
                signals.favorites.retain(|&m| m != id);
                signals.favorites.insert(0, id);
            }
            InteractionAction::Unfavorited => signals.favorites.retain(|&m| m != id),
            InteractionAction::Watched => signals.watched.insert(0, id),
        }
        Ok(())
    }

    async fn record_search(
        &self,
        _user: &UserIdentity,
        term: &str,
    ) -> Result<(), SignalStoreError> {
        if term.trim().is_empty() {
            return Err(SignalStoreError::InvalidInput(
                "search term cannot be empty".to_string(),
            ));
        }
        self.signals.write().await.searches.insert(0, term.to_string());
        self.recorded_searches.write().await.push(term.to_string());
        Ok(())
    }

    async fn has_interaction(
        &self,
        _user: &UserIdentity,
        movie_id: u32,
        action: InteractionAction,
    ) -> Result<bool, SignalStoreError> {
        let signals = self.signals.read().await;
        Ok(match action {
            InteractionAction::Favorited => signals.favorites.contains(&movie_id),
            InteractionAction::Unfavorited => false,
            InteractionAction::Watched => signals.watched.contains(&movie_id),
        })
    }
}
