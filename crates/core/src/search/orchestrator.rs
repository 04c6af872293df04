//! Drives a [`SearchSession`] from keystrokes: debounce, cancellation,
//! default content and result publication.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::config::SearchConfig;
use super::session::{EditOutcome, Resolution, SearchSession, SearchStatus};
use crate::catalog::{CatalogClient, CatalogItem, Genre, TaxonomyCache, UNKNOWN_GENRE};
use crate::identity::UserIdentity;
use crate::metrics;
use crate::recommend::GenreSection;
use crate::signals::SignalStore;

/// Shown instead of the underlying failure.
pub const SEARCH_ERROR_MESSAGE: &str = "Failed to search movies. Please try again.";

/// Everything a search surface needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub session: SearchSession,
    /// Genre rows shown while the query is empty.
    pub defaults: Vec<GenreSection>,
    pub display_limit: usize,
}

/// Rendering decision derived from a [`SearchSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchView<'a> {
    Default { sections: &'a [GenreSection] },
    Searching { term: &'a str },
    Results {
        items: &'a [CatalogItem],
        shown: usize,
        total: u32,
    },
    NoMatch { term: &'a str },
    Error { message: &'a str },
}

impl SearchSnapshot {
    pub fn view(&self) -> SearchView<'_> {
        let session = &self.session;
        match session.status() {
            SearchStatus::Idle => SearchView::Default {
                sections: &self.defaults,
            },
            // Keep showing the previous results until the next search starts.
            SearchStatus::Debouncing if !session.results().is_empty() => self.results_view(),
            SearchStatus::Debouncing | SearchStatus::Searching => SearchView::Searching {
                term: session.term(),
            },
            SearchStatus::Success => self.results_view(),
            SearchStatus::Empty => SearchView::NoMatch {
                term: session.term(),
            },
            SearchStatus::Error => SearchView::Error {
                message: session.error().unwrap_or(SEARCH_ERROR_MESSAGE),
            },
        }
    }

    fn results_view(&self) -> SearchView<'_> {
        let results = self.session.results();
        let shown = results.len().min(self.display_limit);
        SearchView::Results {
            items: &results[..shown],
            shown,
            total: self.session.total_count(),
        }
    }
}

struct State {
    session: SearchSession,
    pending: Option<AbortHandle>,
    defaults: Vec<GenreSection>,
    user: Option<UserIdentity>,
}

struct Shared {
    catalog: Arc<dyn CatalogClient>,
    signals: Arc<dyn SignalStore>,
    taxonomy: Arc<TaxonomyCache>,
    config: SearchConfig,
    state: Mutex<State>,
    updates: watch::Sender<SearchSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.updates.send_replace(SearchSnapshot {
            session: state.session.clone(),
            defaults: state.defaults.clone(),
            display_limit: self.config.display_limit,
        });
    }

    /// Body of the per-keystroke task. Aborted if another keystroke arrives;
    /// `edit` guards against a task that was already past its sleep.
    async fn debounced_search(self: Arc<Self>, edit: u64) {
        tokio::time::sleep(self.config.debounce()).await;

        let ticket = {
            let mut state = self.lock();
            let ticket = state.session.begin(edit);
            if ticket.is_some() {
                self.publish(&state);
            }
            ticket
        };
        let Some(ticket) = ticket else {
            return;
        };

        debug!(
            "Search issued: term='{}', generation={}",
            ticket.term, ticket.generation
        );
        let result = self.catalog.search(&ticket.term).await.map_err(|e| {
            warn!("Search failed: term='{}', error={}", ticket.term, e);
            SEARCH_ERROR_MESSAGE.to_string()
        });

        // History is written before the result is published, so anyone who
        // observes a success can rely on it being recorded.
        if matches!(&result, Ok(page) if !page.items.is_empty()) {
            if let Some(user) = self.current_user_for(ticket.generation) {
                if let Err(e) = self.signals.record_search(&user, &ticket.term).await {
                    warn!("Failed to record search history: {}", e);
                }
            }
        }

        let mut state = self.lock();
        match state.session.resolve(ticket.generation, result) {
            Resolution::Applied => {
                metrics::SEARCH_REQUESTS
                    .with_label_values(&[status_label(state.session.status())])
                    .inc();
                self.publish(&state);
            }
            Resolution::Discarded => {
                debug!("Discarded stale search: generation={}", ticket.generation);
                metrics::SEARCH_DISCARDED.inc();
            }
        }
    }

    /// The bound user, if `generation` is still the live search.
    fn current_user_for(&self, generation: u64) -> Option<UserIdentity> {
        let state = self.lock();
        if state.session.generation() == generation {
            state.user.clone()
        } else {
            None
        }
    }
}

fn status_label(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Success => "success",
        SearchStatus::Empty => "empty",
        SearchStatus::Error => "error",
        _ => "other",
    }
}

/// Type-ahead search over the catalog.
///
/// Each keystroke cancels the previous pending work and restarts the debounce
/// timer. Snapshots are published on a watch channel after every change.
/// Must be used from within a tokio runtime.
pub struct SearchOrchestrator {
    shared: Arc<Shared>,
}

impl SearchOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        signals: Arc<dyn SignalStore>,
        taxonomy: Arc<TaxonomyCache>,
        config: SearchConfig,
    ) -> Self {
        let session = SearchSession::new();
        let (updates, _) = watch::channel(SearchSnapshot {
            session: session.clone(),
            defaults: Vec::new(),
            display_limit: config.display_limit,
        });
        Self {
            shared: Arc::new(Shared {
                catalog,
                signals,
                taxonomy,
                config,
                state: Mutex::new(State {
                    session,
                    pending: None,
                    defaults: Vec::new(),
                    user: None,
                }),
                updates,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// The search box now contains `term`.
    pub fn input(&self, term: &str) {
        let mut state = self.shared.lock();
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        if state.session.edit(term) == EditOutcome::Debounce {
            let edit = state.session.edit_count();
            let task = tokio::spawn(Arc::clone(&self.shared).debounced_search(edit));
            state.pending = Some(task.abort_handle());
        }
        self.shared.publish(&state);
    }

    /// The user picked a result. Returns it if it is among the current
    /// results; the session is reset either way.
    pub fn select_result(&self, movie_id: u32) -> Option<CatalogItem> {
        let mut state = self.shared.lock();
        let selected = state
            .session
            .results()
            .iter()
            .find(|item| item.id == movie_id)
            .cloned();
        Self::reset_locked(&self.shared, &mut state);
        selected
    }

    /// The search surface was dismissed.
    pub fn close(&self) {
        let mut state = self.shared.lock();
        Self::reset_locked(&self.shared, &mut state);
    }

    fn reset_locked(shared: &Shared, state: &mut State) {
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.session.reset();
        shared.publish(state);
    }

    /// Load the genre rows shown while the query is empty and bind the
    /// session to `user` for search history. Anonymous visitors get no rows.
    pub async fn load_default_content(&self, user: Option<&UserIdentity>) {
        let defaults = match user {
            Some(user) => self.default_sections(user).await,
            None => Vec::new(),
        };

        let mut state = self.shared.lock();
        state.user = user.cloned();
        state.defaults = defaults;
        self.shared.publish(&state);
    }

    async fn default_sections(&self, user: &UserIdentity) -> Vec<GenreSection> {
        let shared = &self.shared;
        let genre_ids = match shared.signals.interest_genres(user).await {
            Ok(ids) => {
                let mut seen = std::collections::HashSet::new();
                ids.into_iter()
                    .filter(|id| seen.insert(*id))
                    .collect::<Vec<_>>()
            }
            Err(e) => {
                warn!("Could not read interests for default search content: {}", e);
                return Vec::new();
            }
        };
        if genre_ids.is_empty() {
            return Vec::new();
        }

        let catalog = shared.catalog.as_ref();
        let limit = shared.config.default_section_limit;
        let (taxonomy, lists) = tokio::join!(
            shared.taxonomy.get(catalog),
            join_all(
                genre_ids
                    .iter()
                    .map(|&id| async move { (id, catalog.by_genre(id).await) })
            ),
        );
        let taxonomy = taxonomy
            .map_err(|e| warn!("Genre taxonomy unavailable: {}", e))
            .ok();

        lists
            .into_iter()
            .filter_map(|(genre_id, result)| match result {
                Ok(mut items) => {
                    items.truncate(limit);
                    let name = taxonomy
                        .as_ref()
                        .map_or(UNKNOWN_GENRE, |t| t.display_name(genre_id));
                    Some(GenreSection {
                        genre: Genre {
                            id: genre_id,
                            name: name.to_string(),
                        },
                        items,
                        error: None,
                    })
                }
                Err(e) => {
                    warn!("Default row failed: genre={}, error={}", genre_id, e);
                    None
                }
            })
            .collect()
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().pending.take() {
            pending.abort();
        }
    }
}
