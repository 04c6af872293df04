//! State of a single live text query.
//!
//! Every search that leaves the debounce window is stamped with a new
//! generation. Only a result carrying the current generation, arriving while
//! the session is still searching, may change what the user sees.

use serde::Serialize;

use crate::catalog::{CatalogItem, SearchPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Debouncing,
    Searching,
    Success,
    Empty,
    Error,
}

/// What an edit asks the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The term is blank; the session is idle again.
    Cleared,
    /// Start (or restart) the debounce timer.
    Debounce,
}

/// Whether a resolved result was applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Discarded,
}

/// A search that has left the debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSession {
    term: String,
    generation: u64,
    /// Bumped on every keystroke; ties a debounce timer to its edit.
    #[serde(skip)]
    edits: u64,
    status: SearchStatus,
    results: Vec<CatalogItem>,
    total_count: u32,
    error: Option<String>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            term: String::new(),
            generation: 0,
            edits: 0,
            status: SearchStatus::Idle,
            results: Vec::new(),
            total_count: 0,
            error: None,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sequence number of the latest edit.
    pub fn edit_count(&self) -> u64 {
        self.edits
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn results(&self) -> &[CatalogItem] {
        &self.results
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A keystroke. Blank (whitespace-only) terms clear everything.
    pub fn edit(&mut self, term: &str) -> EditOutcome {
        self.edits += 1;
        self.term = term.to_string();
        if term.trim().is_empty() {
            self.clear_results();
            self.status = SearchStatus::Idle;
            return EditOutcome::Cleared;
        }
        self.status = SearchStatus::Debouncing;
        EditOutcome::Debounce
    }

    /// The debounce timer for `edit` fired. Returns `None` if the session
    /// moved on (another keystroke, cleared, reset or already searching).
    pub fn begin(&mut self, edit: u64) -> Option<SearchTicket> {
        if edit != self.edits
            || self.status != SearchStatus::Debouncing
            || self.term.trim().is_empty()
        {
            return None;
        }
        self.generation += 1;
        self.status = SearchStatus::Searching;
        Some(SearchTicket {
            generation: self.generation,
            term: self.term.trim().to_string(),
        })
    }

    /// Apply a finished search if it is still the one the user is waiting on.
    /// `Err` carries the user-facing message.
    pub fn resolve(&mut self, generation: u64, result: Result<SearchPage, String>) -> Resolution {
        if generation != self.generation || self.status != SearchStatus::Searching {
            return Resolution::Discarded;
        }

        match result {
            Ok(page) if page.items.is_empty() => {
                self.clear_results();
                self.status = SearchStatus::Empty;
            }
            Ok(page) => {
                self.total_count = page.total_count.max(page.items.len() as u32);
                self.results = page.items;
                self.error = None;
                self.status = SearchStatus::Success;
            }
            Err(message) => {
                self.clear_results();
                self.error = Some(message);
                self.status = SearchStatus::Error;
            }
        }
        Resolution::Applied
    }

    /// Back to idle with an empty term, e.g. after a result was picked.
    pub fn reset(&mut self) {
        self.term.clear();
        self.clear_results();
        self.status = SearchStatus::Idle;
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.total_count = 0;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn page(n: u32) -> SearchPage {
        SearchPage {
            items: (1..=n).map(|i| fixtures::movie(i, "Batman")).collect(),
            total_count: n,
        }
    }

    #[test]
    fn test_blank_edit_is_idle() {
        let mut session = SearchSession::new();
        assert_eq!(session.edit("   "), EditOutcome::Cleared);
        assert_eq!(session.status(), SearchStatus::Idle);
        assert!(session.begin(session.edit_count()).is_none());
    }

    #[test]
    fn test_begin_increments_generation() {
        let mut session = SearchSession::new();
        session.edit("bat");
        let first = session.begin(session.edit_count()).unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(session.status(), SearchStatus::Searching);

        // A second timer firing without a new edit does nothing.
        assert!(session.begin(session.edit_count()).is_none());

        session.edit("batman");
        let second = session.begin(session.edit_count()).unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(second.term, "batman");
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut session = SearchSession::new();
        session.edit("bat");
        let old = session.begin(session.edit_count()).unwrap();
        session.edit("batman");
        let current = session.begin(session.edit_count()).unwrap();

        assert_eq!(
            session.resolve(old.generation, Ok(page(3))),
            Resolution::Discarded
        );
        assert_eq!(session.status(), SearchStatus::Searching);
        assert!(session.results().is_empty());

        assert_eq!(
            session.resolve(current.generation, Ok(page(2))),
            Resolution::Applied
        );
        assert_eq!(session.status(), SearchStatus::Success);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn test_result_after_new_keystroke_discarded() {
        let mut session = SearchSession::new();
        session.edit("bat");
        let ticket = session.begin(session.edit_count()).unwrap();
        session.edit("batm");

        assert_eq!(
            session.resolve(ticket.generation, Err("boom".to_string())),
            Resolution::Discarded
        );
        assert_eq!(session.status(), SearchStatus::Debouncing);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_result_after_clear_discarded() {
        let mut session = SearchSession::new();
        session.edit("bat");
        let ticket = session.begin(session.edit_count()).unwrap();
        session.edit("");

        assert_eq!(
            session.resolve(ticket.generation, Ok(page(1))),
            Resolution::Discarded
        );
        assert_eq!(session.status(), SearchStatus::Idle);
    }

    #[test]
    fn test_empty_result_is_not_error() {
        let mut session = SearchSession::new();
        session.edit("zzzqqq");
        let ticket = session.begin(session.edit_count()).unwrap();

        session.resolve(ticket.generation, Ok(SearchPage::default()));

        assert_eq!(session.status(), SearchStatus::Empty);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_error_result() {
        let mut session = SearchSession::new();
        session.edit("alien");
        let ticket = session.begin(session.edit_count()).unwrap();

        session.resolve(ticket.generation, Err("try again".to_string()));

        assert_eq!(session.status(), SearchStatus::Error);
        assert_eq!(session.error(), Some("try again"));
    }

    #[test]
    fn test_reset_clears_term_and_results() {
        let mut session = SearchSession::new();
        session.edit("alien");
        let ticket = session.begin(session.edit_count()).unwrap();
        session.resolve(ticket.generation, Ok(page(4)));

        session.reset();

        assert_eq!(session.term(), "");
        assert_eq!(session.status(), SearchStatus::Idle);
        assert!(session.results().is_empty());
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_timer_for_earlier_edit_cannot_start_search() {
        let mut session = SearchSession::new();
        session.edit("bat");
        let stale = session.edit_count();
        session.edit("batman");

        assert!(session.begin(stale).is_none());
        assert_eq!(session.status(), SearchStatus::Debouncing);
        assert_eq!(session.generation(), 0);

        let ticket = session.begin(session.edit_count()).unwrap();
        assert_eq!(ticket.term, "batman");
        assert_eq!(ticket.generation, 1);
    }

    #[test]
    fn test_generation_never_decreases() {
        let mut session = SearchSession::new();
        let mut last = session.generation();
        for term in ["a", "", "ab", "abc", " ", "abcd"] {
            session.edit(term);
            session.begin(session.edit_count());
            assert!(session.generation() >= last);
            last = session.generation();
        }
        assert_eq!(last, 4);
    }
}
