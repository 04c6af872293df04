use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SignalStoreError;

/// Snapshot of everything the store knows about a user's taste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
    pub interest_genre_ids: Vec<u32>,
    pub favorited_movie_ids: Vec<u32>,
    pub watched_movie_ids: Vec<u32>,
    pub recent_search_terms: Vec<String>,
}

impl SignalProfile {
    pub fn is_empty(&self) -> bool {
        self.interest_genre_ids.is_empty()
            && self.favorited_movie_ids.is_empty()
            && self.watched_movie_ids.is_empty()
            && self.recent_search_terms.is_empty()
    }
}

/// Kind of movie interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAction {
    Favorited,
    Unfavorited,
    /// Opened or played the movie. Also accepted as "viewed".
    #[serde(alias = "viewed")]
    Watched,
}

impl InteractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionAction::Favorited => "favorited",
            InteractionAction::Unfavorited => "unfavorited",
            InteractionAction::Watched => "watched",
        }
    }
}

impl fmt::Display for InteractionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionAction {
    type Err = SignalStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorited" => Ok(InteractionAction::Favorited),
            "unfavorited" => Ok(InteractionAction::Unfavorited),
            "watched" | "viewed" => Ok(InteractionAction::Watched),
            other => Err(SignalStoreError::InvalidInput(format!(
                "unknown interaction action: {}",
                other
            ))),
        }
    }
}

/// A single interaction to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub movie_id: u32,
    pub action: InteractionAction,
    /// Optional 1-10 rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl Interaction {
    pub fn new(movie_id: u32, action: InteractionAction) -> Self {
        Self {
            movie_id,
            action,
            rating: None,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn validate(&self) -> Result<(), SignalStoreError> {
        if self.movie_id == 0 {
            return Err(SignalStoreError::InvalidInput(
                "movie_id is required".to_string(),
            ));
        }
        if let Some(rating) = self.rating {
            if !(1..=10).contains(&rating) {
                return Err(SignalStoreError::InvalidInput(format!(
                    "rating must be between 1 and 10, got {}",
                    rating
                )));
            }
        }
        Ok(())
    }
}
