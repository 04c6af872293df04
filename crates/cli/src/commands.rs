//! Subcommand handlers. Each returns the JSON document printed on stdout.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::{json, Value};
use tracing::info;

use sceneit_core::{
    create_identity_provider,
    filter::{FilterController, FilterToken, FilterView},
    recommend::{GenreBrowser, PipelineFailure, RecommendationAggregator},
    search::{SearchOrchestrator, SearchStatus, SearchView},
    signals::{Interaction, InteractionAction, SignalStore, SqliteSignalStore},
    CatalogClient, Config, SanitizedConfig, TaxonomyCache, TmdbClient, UserIdentity,
};

/// Concrete collaborators wired from configuration.
pub struct App {
    config: Config,
    user: Option<UserIdentity>,
    catalog: Arc<dyn CatalogClient>,
    signals: Arc<dyn SignalStore>,
    taxonomy: Arc<TaxonomyCache>,
}

impl App {
    pub async fn new(config: Config, user_override: Option<&str>) -> Result<Self> {
        let client =
            TmdbClient::new(config.catalog.clone()).context("Failed to create catalog client")?;
        info!("Catalog client initialized: {}", client.base_url());
        let catalog: Arc<dyn CatalogClient> = Arc::new(client);

        let signals: Arc<dyn SignalStore> = Arc::new(
            SqliteSignalStore::new(&config.signals.path)
                .context("Failed to open signal store")?,
        );
        info!("Signal store initialized: {:?}", config.signals.path);

        let user = match user_override {
            Some(id) => Some(UserIdentity::new(id).context("Invalid --user")?),
            None => {
                let provider = create_identity_provider(&config.identity)
                    .context("Failed to create identity provider")?;
                info!("Using identity provider: {}", provider.provider_name());
                provider
                    .current_user()
                    .await
                    .context("Failed to resolve current user")?
            }
        };
        match &user {
            Some(user) => info!("Acting as user {}", user),
            None => info!("Acting as anonymous visitor"),
        }

        Ok(Self {
            config,
            user,
            catalog,
            signals,
            taxonomy: Arc::new(TaxonomyCache::new()),
        })
    }

    fn require_user(&self) -> Result<&UserIdentity> {
        self.user
            .as_ref()
            .ok_or_else(|| {
                anyhow!("This command needs a user; pass --user or set identity.user_id")
            })
    }

    pub async fn discover(&self, filter: &[String]) -> Result<String> {
        let aggregator = RecommendationAggregator::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.signals),
            Arc::clone(&self.taxonomy),
            self.config.recommendations.clone(),
        );
        let aggregation = aggregator.aggregate(self.user.as_ref()).await;

        let mut controller = FilterController::new();
        controller.set_sections(aggregation.sections);
        for raw in filter {
            let token: FilterToken = raw
                .parse()
                .with_context(|| format!("Invalid filter {:?}", raw))?;
            controller.toggle(token);
        }

        let document = discover_document(self.user.as_ref(), &controller, &aggregation.failures);
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub async fn search(&self, term: &str) -> Result<String> {
        if term.trim().is_empty() {
            bail!("Search term cannot be empty");
        }

        let search = SearchOrchestrator::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.signals),
            Arc::clone(&self.taxonomy),
            self.config.search.clone(),
        );
        search.load_default_content(self.user.as_ref()).await;

        let mut updates = search.subscribe();
        search.input(term);
        let snapshot = updates
            .wait_for(|s| {
                matches!(
                    s.session.status(),
                    SearchStatus::Success | SearchStatus::Empty | SearchStatus::Error
                )
            })
            .await
            .context("Search stopped before finishing")?
            .clone();

        let document = match snapshot.view() {
            SearchView::Results {
                items,
                shown,
                total,
            } => json!({
                "status": "success",
                "term": snapshot.session.term(),
                "shown": shown,
                "total": total,
                "items": items,
            }),
            SearchView::NoMatch { term } => json!({ "status": "empty", "term": term }),
            SearchView::Error { message } => json!({ "status": "error", "message": message }),
            SearchView::Default { .. } | SearchView::Searching { .. } => {
                bail!("Search ended in an unexpected state")
            }
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub async fn browse(&self, page: usize) -> Result<String> {
        let browser = GenreBrowser::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.taxonomy),
            self.config.browse.clone(),
        );
        let page = browser
            .page(page)
            .await
            .context("Failed to load genre page")?;
        Ok(serde_json::to_string_pretty(&page)?)
    }

    pub async fn replace_interests(&self, genre_ids: &[u32]) -> Result<String> {
        let user = self.require_user()?;
        self.signals
            .replace_interests(user, genre_ids)
            .await
            .context("Failed to save interests")?;
        info!("Saved {} interests for {}", genre_ids.len(), user);

        let document = json!({ "user": user.user_id(), "interests": genre_ids });
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub async fn interact(
        &self,
        movie_id: u32,
        action: &str,
        rating: Option<u8>,
    ) -> Result<String> {
        let user = self.require_user()?;
        let action: InteractionAction = action.parse()?;
        let mut interaction = Interaction::new(movie_id, action);
        if let Some(rating) = rating {
            interaction = interaction.with_rating(rating);
        }

        self.signals
            .record_interaction(user, &interaction)
            .await
            .context("Failed to record interaction")?;

        let document = json!({ "user": user.user_id(), "interaction": interaction });
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn sanitized_config(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SanitizedConfig::from(
            &self.config,
        ))?)
    }
}

/// `view` tells a selection that hides everything apart from a feed with
/// no sections at all.
fn discover_document(
    user: Option<&UserIdentity>,
    controller: &FilterController,
    failures: &[PipelineFailure],
) -> Value {
    let (view, sections) = match controller.view() {
        FilterView::Sections(sections) => ("sections", sections),
        FilterView::Loading => ("loading", Vec::new()),
        FilterView::NoMatch => ("no_match", Vec::new()),
    };
    json!({
        "user": user.map(|u| u.user_id()),
        "filter": controller.selection().tokens(),
        "options": controller.options(),
        "view": view,
        "sections": sections,
        "failures": failures,
    })
}

/// Render the registry in Prometheus text format.
pub fn encode_metrics(registry: &Registry) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    Ok(String::from_utf8(buffer)?)
}
