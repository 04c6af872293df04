pub mod assistant;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod identity;
pub mod metrics;
pub mod recommend;
pub mod search;
pub mod signals;
pub mod testing;

pub use assistant::{Assistant, AssistantContext, AssistantError, LanguageModel};
pub use catalog::{CatalogClient, CatalogError, CatalogItem, TaxonomyCache, TmdbClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use filter::{FilterController, FilterSelection, FilterToken, FilterView};
pub use identity::{create_identity_provider, IdentityError, IdentityProvider, UserIdentity};
pub use recommend::{
    Aggregation, Category, GenreBrowser, RecommendationAggregator, Section, SectionBoard,
};
pub use search::{SearchOrchestrator, SearchSnapshot, SearchStatus, SearchView};
pub use signals::{SignalStore, SignalStoreError, SqliteSignalStore};
