//! Movie catalog data as seen by the discovery engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display name used when a genre id has no entry in the taxonomy.
pub const UNKNOWN_GENRE: &str = "Unknown";

// ============================================================================
// Catalog items
// ============================================================================

/// A movie as returned by the external catalog. Fetched fresh per query and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Catalog-wide unique id.
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Release date (YYYY-MM-DD), absent when the catalog has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl CatalogItem {
    /// Extract year from release date.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

/// One page of search results plus the catalog's total hit count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    pub items: Vec<CatalogItem>,
    pub total_count: u32,
}

// ============================================================================
// Genres
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Frozen genre id to name mapping, built once per session.
#[derive(Debug, Clone, Default)]
pub struct GenreTaxonomy {
    genres: Vec<Genre>,
    names: HashMap<u32, String>,
}

impl GenreTaxonomy {
    /// Build from a genre list. The first entry for a given id wins.
    pub fn from_genres(genres: impl IntoIterator<Item = Genre>) -> Self {
        let mut names = HashMap::new();
        let mut ordered = Vec::new();
        for genre in genres {
            if names.contains_key(&genre.id) {
                continue;
            }
            names.insert(genre.id, genre.name.clone());
            ordered.push(genre);
        }
        Self {
            genres: ordered,
            names,
        }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for display, falling back to "Unknown".
    pub fn display_name(&self, id: u32) -> &str {
        self.name(id).unwrap_or(UNKNOWN_GENRE)
    }

    /// Genres in first-seen order.
    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

/// Shorten `text` to at most `max` characters, appending "..." when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: u32, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_catalog_item_year() {
        let mut item = CatalogItem {
            id: 1,
            title: "Heat".to_string(),
            overview: String::new(),
            release_date: Some("1995-12-15".to_string()),
            poster_path: None,
            backdrop_path: None,
            vote_average: 7.9,
            genre_ids: vec![28, 80],
        };
        assert_eq!(item.year(), Some(1995));

        item.release_date = Some("soon".to_string());
        assert_eq!(item.year(), None);

        item.release_date = None;
        assert_eq!(item.year(), None);
    }

    #[test]
    fn test_taxonomy_first_entry_wins() {
        let taxonomy = GenreTaxonomy::from_genres(vec![
            genre(28, "Action"),
            genre(10759, "Action & Adventure"),
            genre(28, "Action (TV)"),
        ]);
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.name(28), Some("Action"));
        assert_eq!(taxonomy.genres()[1].id, 10759);
    }

    #[test]
    fn test_taxonomy_unknown_display_name() {
        let taxonomy = GenreTaxonomy::from_genres(vec![genre(18, "Drama")]);
        assert_eq!(taxonomy.display_name(18), "Drama");
        assert_eq!(taxonomy.display_name(9999), UNKNOWN_GENRE);
        assert!(GenreTaxonomy::default().is_empty());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
        // Multi-byte characters are counted, not bytes.
        assert_eq!(truncate_text("ééééé", 2), "éé...");
    }
}
