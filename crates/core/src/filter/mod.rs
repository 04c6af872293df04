//! Category filtering over already-fetched recommendation sections.
//!
//! Filtering never triggers a fetch; it only recomputes which of the current
//! sections are visible.

mod selection;

pub use selection::{FilterSelection, FilterToken};

use serde::Serialize;
use std::collections::BTreeSet;

use crate::recommend::{populated_categories, Category, Section};

/// Label of the reset option.
pub const ALL_LABEL: &str = "All Recommendations";

/// Categories that are both populated and selected.
pub fn apply_filter(
    selection: &FilterSelection,
    populated: &BTreeSet<Category>,
) -> BTreeSet<Category> {
    populated
        .iter()
        .copied()
        .filter(|c| selection.includes(*c))
        .collect()
}

/// What the recommendation area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterView<'a> {
    /// Visible sections in display order.
    Sections(Vec<&'a Section>),
    /// Nothing visible yet but some categories are still loading.
    Loading,
    /// The selection hides every populated category.
    NoMatch,
}

/// One entry in the filter panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub token: FilterToken,
    pub label: String,
    /// Number of populated sections behind this option.
    pub count: usize,
    pub selected: bool,
}

/// Holds the current sections and the user's category selection.
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    selection: FilterSelection,
    sections: Vec<Section>,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new set of sections. The selection is kept.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn toggle(&mut self, token: FilterToken) {
        self.selection.toggle(token);
    }

    /// Reset to `all`.
    pub fn clear(&mut self) {
        self.selection.select_all();
    }

    pub fn active_count(&self) -> usize {
        self.selection.active_count()
    }

    pub fn populated_categories(&self) -> BTreeSet<Category> {
        populated_categories(&self.sections)
    }

    pub fn visible_categories(&self) -> BTreeSet<Category> {
        apply_filter(&self.selection, &self.populated_categories())
    }

    pub fn view(&self) -> FilterView<'_> {
        let visible = self.visible_categories();
        let sections: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.is_populated() && visible.contains(&s.category))
            .collect();

        if !sections.is_empty() {
            return FilterView::Sections(sections);
        }
        if self.sections.iter().any(|s| s.loading) {
            FilterView::Loading
        } else {
            FilterView::NoMatch
        }
    }

    /// Filter panel entries: `all` first with the total, then each populated
    /// category.
    pub fn options(&self) -> Vec<FilterOption> {
        let category_options: Vec<FilterOption> = Category::ALL
            .into_iter()
            .map(|category| FilterOption {
                token: FilterToken::Category(category),
                label: category.label().to_string(),
                count: self
                    .sections
                    .iter()
                    .filter(|s| s.category == category && s.is_populated())
                    .count(),
                selected: !self.selection.is_all() && self.selection.includes(category),
            })
            .filter(|o| o.count > 0)
            .collect();

        let total = category_options.iter().map(|o| o.count).sum();
        let mut options = vec![FilterOption {
            token: FilterToken::All,
            label: ALL_LABEL.to_string(),
            count: total,
            selected: self.selection.is_all(),
        }];
        options.extend(category_options);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn section(key: &str, category: Category, items: usize) -> Section {
        Section::new(
            key,
            key,
            category,
            (0..items as u32).map(|i| fixtures::movie(i + 1, "M")).collect(),
        )
    }

    fn controller() -> FilterController {
        let mut controller = FilterController::new();
        controller.set_sections(vec![
            section("trending", Category::Trending, 3),
            section("popular", Category::Trending, 2),
            section("interests:28", Category::Interests, 4),
            section("favorites:1", Category::Favorites, 0),
            section("searches:dune", Category::Searches, 1),
        ]);
        controller
    }

    #[test]
    fn test_all_shows_every_populated_category() {
        let controller = controller();
        let visible = controller.visible_categories();
        assert_eq!(
            visible,
            BTreeSet::from([Category::Trending, Category::Interests, Category::Searches])
        );
    }

    #[test]
    fn test_all_is_idempotent_after_other_selections() {
        let mut controller = controller();
        controller.toggle(Category::Searches.into());
        controller.toggle(Category::Interests.into());
        controller.toggle(FilterToken::All);

        assert_eq!(
            controller.visible_categories(),
            controller.populated_categories()
        );
    }

    #[test]
    fn test_selection_limits_visible_sections() {
        let mut controller = controller();
        controller.toggle(Category::Trending.into());

        match controller.view() {
            FilterView::Sections(sections) => {
                let keys: Vec<&str> = sections.iter().map(|s| s.key.as_str()).collect();
                assert_eq!(keys, vec!["trending", "popular"]);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_unpopulated_selection_is_no_match() {
        let mut controller = controller();
        controller.toggle(Category::Favorites.into());

        assert!(controller.visible_categories().is_empty());
        assert_eq!(controller.view(), FilterView::NoMatch);
    }

    #[test]
    fn test_loading_view_while_pipelines_run() {
        let mut controller = FilterController::new();
        controller.set_sections(vec![Section::placeholder(Category::Trending)]);
        assert_eq!(controller.view(), FilterView::Loading);
    }

    #[test]
    fn test_options_skip_empty_categories() {
        let controller = controller();
        let options = controller.options();

        let tokens: Vec<&str> = options.iter().map(|o| o.token.as_str()).collect();
        assert_eq!(tokens, vec!["all", "trending", "interests", "searches"]);
        assert_eq!(options[0].label, ALL_LABEL);
        assert_eq!(options[0].count, 4);
        assert!(options[0].selected);
        assert_eq!(options[1].label, "Trending & Popular");
        assert_eq!(options[1].count, 2);
    }

    #[test]
    fn test_new_sections_keep_selection() {
        let mut controller = controller();
        controller.toggle(Category::Interests.into());
        controller.set_sections(vec![section("trending", Category::Trending, 1)]);

        assert_eq!(controller.active_count(), 1);
        assert_eq!(controller.view(), FilterView::NoMatch);

        controller.clear();
        assert!(controller.selection().is_all());
        assert!(matches!(controller.view(), FilterView::Sections(_)));
    }
}
