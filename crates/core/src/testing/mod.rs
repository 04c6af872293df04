//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator trait, so discovery flows can be exercised
//! without a network or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use sceneit_core::testing::{fixtures, MockCatalog, MockSignalStore};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_genres(fixtures::standard_genres()).await;
//! catalog.set_trending(vec![fixtures::movie(1, "Dune")]).await;
//!
//! let signals = MockSignalStore::new();
//! signals.set_interests(vec![28]).await;
//! ```

mod mock_catalog;
mod mock_language_model;
mod mock_signals;

pub use mock_catalog::{MockCatalog, RecordedCatalogQuery};
pub use mock_language_model::MockLanguageModel;
pub use mock_signals::MockSignalStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogItem, Genre};

    /// A movie with reasonable defaults.
    pub fn movie(id: u32, title: &str) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            overview: format!("{} is a film.", title),
            release_date: Some("2001-06-15".to_string()),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            vote_average: 7.2,
            genre_ids: Vec::new(),
        }
    }

    /// A movie tagged with genres.
    pub fn movie_in_genres(id: u32, title: &str, genre_ids: &[u32]) -> CatalogItem {
        CatalogItem {
            genre_ids: genre_ids.to_vec(),
            ..movie(id, title)
        }
    }

    /// The usual movie genre list, Action first.
    pub fn standard_genres() -> Vec<Genre> {
        [
            (28, "Action"),
            (12, "Adventure"),
            (16, "Animation"),
            (35, "Comedy"),
            (80, "Crime"),
            (99, "Documentary"),
            (18, "Drama"),
            (14, "Fantasy"),
            (27, "Horror"),
            (9648, "Mystery"),
            (10749, "Romance"),
            (878, "Science Fiction"),
            (53, "Thriller"),
        ]
        .into_iter()
        .map(|(id, name)| Genre {
            id,
            name: name.to_string(),
        })
        .collect()
    }
}
