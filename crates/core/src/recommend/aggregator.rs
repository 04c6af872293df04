//! Builds personalized recommendation sections from independent signals.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::RecommendationConfig;
use super::types::{
    Aggregation, Category, FailureSource, PipelineFailure, Section, SectionBoard,
};
use crate::catalog::{CatalogClient, TaxonomyCache, UNKNOWN_GENRE};
use crate::identity::{IdentityProvider, UserIdentity};
use crate::metrics;
use crate::signals::SignalStore;

type Pipeline<'a> = Pin<Box<dyn Future<Output = CategoryOutcome> + Send + 'a>>;

/// Sections and swallowed failures from one category pipeline.
#[derive(Debug)]
struct CategoryOutcome {
    category: Category,
    sections: Vec<Section>,
    failures: Vec<PipelineFailure>,
}

impl CategoryOutcome {
    fn new(category: Category) -> Self {
        Self {
            category,
            sections: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, source: FailureSource, unit: impl Into<String>, error: impl ToString) {
        let failure = PipelineFailure {
            category: self.category,
            source,
            unit: unit.into(),
            message: error.to_string(),
        };
        warn!(
            "Recommendation unit failed: category={}, unit='{}', error={}",
            failure.category, failure.unit, failure.message
        );
        metrics::PIPELINE_FAILURES
            .with_label_values(&[self.category.as_str(), source.as_str()])
            .inc();
        self.failures.push(failure);
    }
}

/// Orchestrates catalog and signal-store calls into recommendation sections.
///
/// Each category runs as its own pipeline; a failure inside one pipeline
/// never affects another. Progress is published on a watch channel so a
/// caller can render placeholders and fill them in as categories finish.
pub struct RecommendationAggregator {
    catalog: Arc<dyn CatalogClient>,
    signals: Arc<dyn SignalStore>,
    taxonomy: Arc<TaxonomyCache>,
    config: RecommendationConfig,
    progress: watch::Sender<SectionBoard>,
}

impl RecommendationAggregator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        signals: Arc<dyn SignalStore>,
        taxonomy: Arc<TaxonomyCache>,
        config: RecommendationConfig,
    ) -> Self {
        let (progress, _) = watch::channel(SectionBoard::default());
        Self {
            catalog,
            signals,
            taxonomy,
            config,
            progress,
        }
    }

    /// Receive a fresh board every time a category finishes.
    pub fn subscribe(&self) -> watch::Receiver<SectionBoard> {
        self.progress.subscribe()
    }

    /// Aggregate for whoever the identity provider says is signed in.
    ///
    /// An identity lookup failure is treated as an anonymous visit.
    pub async fn aggregate_current(&self, identity: &dyn IdentityProvider) -> Aggregation {
        let user = match identity.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("Identity lookup failed, aggregating anonymously: {}", e);
                None
            }
        };
        self.aggregate(user.as_ref()).await
    }

    /// Build sections for `user`, or the anonymous trending/popular pair.
    pub async fn aggregate(&self, user: Option<&UserIdentity>) -> Aggregation {
        let started = Instant::now();

        let mut pipelines: Vec<Pipeline<'_>> = vec![Box::pin(self.trending_pipeline())];
        if let Some(user) = user {
            pipelines.push(Box::pin(self.interests_pipeline(user)));
            pipelines.push(Box::pin(self.searches_pipeline(user)));
            pipelines.push(Box::pin(self.similar_pipeline(
                user,
                Category::Favorites,
                self.config.favorites_limit,
            )));
            pipelines.push(Box::pin(self.similar_pipeline(
                user,
                Category::Watched,
                self.config.watched_limit,
            )));
        }

        let categories: Vec<Category> = match user {
            Some(_) => Category::ALL.to_vec(),
            None => vec![Category::Trending],
        };
        let mut board = SectionBoard::new(categories);
        self.progress.send_replace(board.clone());

        let mut failures = Vec::new();
        let mut running: FuturesUnordered<Pipeline<'_>> = pipelines.into_iter().collect();
        while let Some(outcome) = running.next().await {
            debug!(
                "Category finished: {} ({} sections, {} failures)",
                outcome.category,
                outcome.sections.len(),
                outcome.failures.len()
            );
            metrics::SECTIONS_PRODUCED
                .with_label_values(&[outcome.category.as_str()])
                .inc_by(outcome.sections.len() as u64);
            failures.extend(outcome.failures);
            board.complete(outcome.category, outcome.sections);
            self.progress.send_replace(board.clone());
        }

        let audience = if user.is_some() {
            "personalized"
        } else {
            "anonymous"
        };
        metrics::AGGREGATION_DURATION
            .with_label_values(&[audience])
            .observe(started.elapsed().as_secs_f64());

        let sections = board.sections();
        info!(
            "Aggregation complete: audience={}, sections={}, failures={}",
            audience,
            sections.len(),
            failures.len()
        );

        Aggregation { sections, failures }
    }

    async fn trending_pipeline(&self) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::new(Category::Trending);
        let (trending, popular) = tokio::join!(self.catalog.trending(), self.catalog.popular());

        match trending {
            Ok(items) => outcome.sections.push(Section::new(
                "trending",
                "Trending Now",
                Category::Trending,
                items,
            )),
            Err(e) => outcome.fail(FailureSource::Catalog, "trending", e),
        }
        match popular {
            Ok(items) => {
                outcome
                    .sections
                    .push(Section::new("popular", "Popular", Category::Trending, items))
            }
            Err(e) => outcome.fail(FailureSource::Catalog, "popular", e),
        }

        outcome
    }

    async fn interests_pipeline(&self, user: &UserIdentity) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::new(Category::Interests);
        let genre_ids = match self.signals.interest_genres(user).await {
            Ok(ids) => distinct_ids(ids),
            Err(e) => {
                outcome.fail(FailureSource::Signals, "interest genres", e);
                return outcome;
            }
        };
        if genre_ids.is_empty() {
            return outcome;
        }

        let catalog = self.catalog.as_ref();
        let (taxonomy, lists) = tokio::join!(
            self.taxonomy.get(catalog),
            join_all(
                genre_ids
                    .iter()
                    .map(|&id| async move { (id, catalog.by_genre(id).await) })
            ),
        );

        // Names degrade to "Unknown" rather than failing the category.
        let taxonomy = match taxonomy {
            Ok(taxonomy) => Some(taxonomy),
            Err(e) => {
                outcome.fail(FailureSource::Catalog, "genre taxonomy", e);
                None
            }
        };

        for (genre_id, result) in lists {
            match result {
                Ok(items) => {
                    let name = taxonomy
                        .as_ref()
                        .map_or(UNKNOWN_GENRE, |t| t.display_name(genre_id));
                    outcome.sections.push(Section::new(
                        format!("interests:{}", genre_id),
                        format!("Because you are interested in {}", name),
                        Category::Interests,
                        items,
                    ));
                }
                Err(e) => outcome.fail(FailureSource::Catalog, format!("genre {}", genre_id), e),
            }
        }

        outcome
    }

    async fn searches_pipeline(&self, user: &UserIdentity) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::new(Category::Searches);
        let terms = match self.signals.recent_searches(user).await {
            Ok(terms) => distinct_terms(terms, self.config.search_terms_limit),
            Err(e) => {
                outcome.fail(FailureSource::Signals, "recent searches", e);
                return outcome;
            }
        };

        let catalog = self.catalog.as_ref();
        let results = join_all(terms.into_iter().map(|term| async move {
            let result = catalog.search(&term).await;
            (term, result)
        }))
        .await;

        for (term, result) in results {
            match result {
                Ok(page) => {
                    let mut items = page.items;
                    items.truncate(self.config.search_results_limit);
                    if items.is_empty() {
                        continue;
                    }
                    outcome.sections.push(Section::new(
                        format!("searches:{}", term),
                        format!("Because you searched for \"{}\"", term),
                        Category::Searches,
                        items,
                    ));
                }
                Err(e) => outcome.fail(FailureSource::Catalog, format!("search '{}'", term), e),
            }
        }

        outcome
    }

    /// Favorites and watched share a shape: resolve the base title and its
    /// similar movies for the first few distinct seeds.
    async fn similar_pipeline(
        &self,
        user: &UserIdentity,
        category: Category,
        limit: usize,
    ) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::new(category);
        let (seeds, verb) = match category {
            Category::Watched => (self.signals.watched_movie_ids(user).await, "watched"),
            _ => (self.signals.favorited_movie_ids(user).await, "liked"),
        };
        let seeds: Vec<u32> = match seeds {
            Ok(ids) => distinct_ids(ids).into_iter().take(limit).collect(),
            Err(e) => {
                outcome.fail(FailureSource::Signals, format!("{} movies", verb), e);
                return outcome;
            }
        };

        let catalog = self.catalog.as_ref();
        let results = join_all(seeds.into_iter().map(|movie_id| async move {
            let (detail, similar) =
                tokio::join!(catalog.detail(movie_id), catalog.recommendations_for(movie_id));
            (movie_id, detail, similar)
        }))
        .await;

        for (movie_id, detail, similar) in results {
            match (detail, similar) {
                (Ok(base), Ok(items)) => outcome.sections.push(Section::new(
                    format!("{}:{}", category.as_str(), movie_id),
                    format!("Because you {} {}", verb, base.title),
                    category,
                    items,
                )),
                (Err(e), _) | (_, Err(e)) => {
                    outcome.fail(FailureSource::Catalog, format!("movie {}", movie_id), e)
                }
            }
        }

        outcome
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn distinct_ids(ids: Vec<u32>) -> Vec<u32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Trimmed, non-blank, exact-match distinct terms, capped at `limit`.
fn distinct_terms(terms: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .take(limit)
        .collect()
}
