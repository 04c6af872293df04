use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::TmdbConfig;
use crate::recommend::{BrowseConfig, RecommendationConfig};
use crate::search::SearchConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: TmdbConfig,
    #[serde(default)]
    pub signals: SignalStoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
}

/// Where per-user signals (interests, favorites, history) are persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignalStoreConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for SignalStoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("sceneit.db")
}

/// Which user the process acts on behalf of. Unset means anonymous.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Sanitized config for display (API key redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    pub signals: SignalStoreConfig,
    pub identity: IdentityConfig,
    pub recommendations: RecommendationConfig,
    pub search: SearchConfig,
    pub browse: BrowseConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                api_key_configured: !config.catalog.api_key.trim().is_empty(),
                base_url: config.catalog.base_url.clone(),
                timeout_secs: config.catalog.timeout_secs,
            },
            signals: config.signals.clone(),
            identity: config.identity.clone(),
            recommendations: config.recommendations.clone(),
            search: config.search.clone(),
            browse: config.browse.clone(),
        }
    }
}
