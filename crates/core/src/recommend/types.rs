use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::catalog::{CatalogItem, Genre};

// ============================================================================
// Categories
// ============================================================================

/// Signal category a section was derived from. Declaration order is display
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Trending,
    Interests,
    Searches,
    Favorites,
    Watched,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Trending,
        Category::Interests,
        Category::Searches,
        Category::Favorites,
        Category::Watched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::Interests => "interests",
            Category::Searches => "searches",
            Category::Favorites => "favorites",
            Category::Watched => "watched",
        }
    }

    /// Human label used by filter controls.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Trending => "Trending & Popular",
            Category::Interests => "Your Interests",
            Category::Searches => "Recent Searches",
            Category::Favorites => "Similar to Favorites",
            Category::Watched => "Because You Watched",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

// ============================================================================
// Sections
// ============================================================================

/// A titled row of movies derived from one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable per category and subject, e.g. `interests:28`.
    pub key: String,
    pub title: String,
    pub category: Category,
    pub items: Vec<CatalogItem>,
    /// True only for placeholders whose pipeline has not finished.
    #[serde(default)]
    pub loading: bool,
}

impl Section {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        items: Vec<CatalogItem>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            category,
            items,
            loading: false,
        }
    }

    /// Stand-in shown while a category is still loading.
    pub fn placeholder(category: Category) -> Self {
        Self {
            key: format!("{}:loading", category.as_str()),
            title: category.label().to_string(),
            category,
            items: Vec::new(),
            loading: true,
        }
    }

    /// Finished loading and has at least one item.
    pub fn is_populated(&self) -> bool {
        !self.loading && !self.items.is_empty()
    }
}

/// Where a swallowed failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSource {
    Signals,
    Catalog,
}

impl FailureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureSource::Signals => "signals",
            FailureSource::Catalog => "catalog",
        }
    }
}

/// A unit of work that failed and was dropped from the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFailure {
    pub category: Category,
    pub source: FailureSource,
    /// What was being fetched, e.g. `movie 550` or `genre 28`.
    pub unit: String,
    pub message: String,
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub sections: Vec<Section>,
    pub failures: Vec<PipelineFailure>,
}

impl Aggregation {
    /// Categories with at least one non-empty section.
    pub fn populated_categories(&self) -> BTreeSet<Category> {
        populated_categories(&self.sections)
    }

    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Categories with at least one populated section.
pub fn populated_categories(sections: &[Section]) -> BTreeSet<Category> {
    sections
        .iter()
        .filter(|s| s.is_populated())
        .map(|s| s.category)
        .collect()
}

// ============================================================================
// Progressive board
// ============================================================================

/// Sections as they arrive. Each pending category shows one placeholder that
/// is replaced wholesale when the category's pipeline finishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBoard {
    slots: BTreeMap<Category, Vec<Section>>,
    pending: BTreeSet<Category>,
}

impl SectionBoard {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut board = Self::default();
        for category in categories {
            board
                .slots
                .insert(category, vec![Section::placeholder(category)]);
            board.pending.insert(category);
        }
        board
    }

    /// Replace a category's placeholder with its final sections.
    pub fn complete(&mut self, category: Category, sections: Vec<Section>) {
        self.pending.remove(&category);
        self.slots.insert(category, sections);
    }

    pub fn is_pending(&self, category: Category) -> bool {
        self.pending.contains(&category)
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// All sections in category order.
    pub fn sections(&self) -> Vec<Section> {
        self.slots.values().flatten().cloned().collect()
    }
}

// ============================================================================
// Genre rows
// ============================================================================

/// Movies for one genre, used by genre browsing and the search default view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreSection {
    pub genre: Genre,
    pub items: Vec<CatalogItem>,
    /// Set when the genre's movies could not be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
