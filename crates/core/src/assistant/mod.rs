//! Conversational recommendations.
//!
//! The language model itself is opaque; this module only assembles what it
//! is told about the user and passes the question along.

mod context;

pub use context::{AssistantContext, MovieSummary, GENERAL_CONTEXT};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{CatalogClient, TaxonomyCache};
use crate::identity::UserIdentity;
use crate::signals::SignalStore;

const SYSTEM_PROMPT: &str = "You are SceneIt AI, a movie recommendation assistant. \
Use the user's interests, favorites, watch history and searches to suggest movies, \
preferring titles from the trending and popular lists. Put movie titles in quotes.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Language model error: {0}")]
    Model(String),
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, for logging.
    fn model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<String, AssistantError>;
}

/// Answers free-form movie questions with the user's profile as context.
pub struct Assistant {
    catalog: Arc<dyn CatalogClient>,
    signals: Arc<dyn SignalStore>,
    taxonomy: Arc<TaxonomyCache>,
    model: Arc<dyn LanguageModel>,
}

impl Assistant {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        signals: Arc<dyn SignalStore>,
        taxonomy: Arc<TaxonomyCache>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            catalog,
            signals,
            taxonomy,
            model,
        }
    }

    pub async fn chat(
        &self,
        user: Option<&UserIdentity>,
        message: &str,
    ) -> Result<String, AssistantError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let context = match user {
            Some(user) => {
                AssistantContext::build(
                    user,
                    self.catalog.as_ref(),
                    self.signals.as_ref(),
                    &self.taxonomy,
                )
                .await
                .to_json()
            }
            None => GENERAL_CONTEXT.to_string(),
        };

        debug!(
            "Assistant request: model={}, context_bytes={}",
            self.model.model(),
            context.len()
        );
        let request = CompletionRequest::new(build_prompt(&context, message))
            .with_system(SYSTEM_PROMPT)
            .with_max_tokens(600);
        self.model.complete(request).await
    }
}

fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Context about the user and available movies:\n{}\n\nUser message:\n{}",
        context, question
    )
}
