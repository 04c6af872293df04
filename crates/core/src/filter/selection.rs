use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::recommend::{Category, ParseCategoryError};

/// A filter control token: the reserved `all` or a concrete category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterToken {
    All,
    Category(Category),
}

impl FilterToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterToken::All => "all",
            FilterToken::Category(c) => c.as_str(),
        }
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterToken {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterToken::All),
            other => other.parse().map(FilterToken::Category),
        }
    }
}

impl TryFrom<String> for FilterToken {
    type Error = ParseCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterToken> for String {
    fn from(token: FilterToken) -> Self {
        token.as_str().to_string()
    }
}

impl From<Category> for FilterToken {
    fn from(category: Category) -> Self {
        FilterToken::Category(category)
    }
}

/// Which categories the user wants to see.
///
/// Either everything (`all`) or a non-empty set of concrete categories; the
/// two are never mixed. An empty concrete set is represented as `all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    only: BTreeSet<Category>,
}

impl FilterSelection {
    /// The `{all}` selection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from raw tokens. Concrete categories win over `all`; no tokens
    /// means `all`.
    pub fn from_tokens(tokens: impl IntoIterator<Item = FilterToken>) -> Self {
        let only = tokens
            .into_iter()
            .filter_map(|t| match t {
                FilterToken::Category(c) => Some(c),
                FilterToken::All => None,
            })
            .collect();
        Self { only }
    }

    pub fn is_all(&self) -> bool {
        self.only.is_empty()
    }

    /// Whether `category` passes this selection.
    pub fn includes(&self, category: Category) -> bool {
        self.is_all() || self.only.contains(&category)
    }

    /// Toggle a control. `all` resets; a category is added (leaving `all`)
    /// or removed (reverting to `all` once none remain).
    pub fn toggle(&mut self, token: FilterToken) {
        match token {
            FilterToken::All => self.select_all(),
            FilterToken::Category(category) => {
                if !self.only.remove(&category) {
                    self.only.insert(category);
                }
            }
        }
    }

    pub fn select_all(&mut self) {
        self.only.clear();
    }

    /// Current tokens, `[all]` or the concrete categories in display order.
    pub fn tokens(&self) -> Vec<FilterToken> {
        if self.is_all() {
            vec![FilterToken::All]
        } else {
            self.only.iter().copied().map(FilterToken::Category).collect()
        }
    }

    /// Number shown on the filter badge.
    pub fn active_count(&self) -> usize {
        self.only.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all() {
        let selection = FilterSelection::default();
        assert!(selection.is_all());
        assert_eq!(selection.tokens(), vec![FilterToken::All]);
        assert_eq!(selection.active_count(), 1);
    }

    #[test]
    fn test_selecting_category_leaves_all() {
        let mut selection = FilterSelection::all();
        selection.toggle(Category::Searches.into());

        assert!(!selection.is_all());
        assert_eq!(
            selection.tokens(),
            vec![FilterToken::Category(Category::Searches)]
        );
        assert!(selection.includes(Category::Searches));
        assert!(!selection.includes(Category::Trending));
    }

    #[test]
    fn test_removing_last_category_reverts_to_all() {
        let mut selection = FilterSelection::all();
        selection.toggle(Category::Favorites.into());
        selection.toggle(Category::Favorites.into());
        assert!(selection.is_all());
    }

    #[test]
    fn test_toggle_all_resets() {
        let mut selection = FilterSelection::all();
        selection.toggle(Category::Favorites.into());
        selection.toggle(Category::Watched.into());
        assert_eq!(selection.active_count(), 2);

        selection.toggle(FilterToken::All);
        assert!(selection.is_all());
    }

    /// Exhaustive sequences of up to four toggles over every token.
    #[test]
    fn test_selection_never_empty_or_mixed() {
        let tokens: Vec<FilterToken> = std::iter::once(FilterToken::All)
            .chain(Category::ALL.into_iter().map(FilterToken::Category))
            .collect();

        let mut sequences: Vec<Vec<FilterToken>> = vec![vec![]];
        for _ in 0..4 {
            sequences = sequences
                .into_iter()
                .flat_map(|seq| {
                    tokens.iter().map(move |t| {
                        let mut next = seq.clone();
                        next.push(*t);
                        next
                    })
                })
                .collect();

            for seq in &sequences {
                let mut selection = FilterSelection::all();
                for token in seq {
                    selection.toggle(*token);
                }
                let current = selection.tokens();
                assert!(!current.is_empty());
                if current.contains(&FilterToken::All) {
                    assert_eq!(current.len(), 1, "mixed selection after {:?}", seq);
                }
            }
        }
    }

    #[test]
    fn test_token_parse_and_serde() {
        assert_eq!("all".parse::<FilterToken>().unwrap(), FilterToken::All);
        assert_eq!(
            "watched".parse::<FilterToken>().unwrap(),
            FilterToken::Category(Category::Watched)
        );
        assert!("everything".parse::<FilterToken>().is_err());

        let json = serde_json::to_string(&FilterToken::Category(Category::Interests)).unwrap();
        assert_eq!(json, r#""interests""#);
        let back: FilterToken = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(back, FilterToken::All);
    }

    #[test]
    fn test_from_tokens_normalizes() {
        let selection = FilterSelection::from_tokens([
            FilterToken::All,
            FilterToken::Category(Category::Trending),
        ]);
        assert_eq!(
            selection.tokens(),
            vec![FilterToken::Category(Category::Trending)]
        );
        assert!(FilterSelection::from_tokens([]).is_all());
    }
}
