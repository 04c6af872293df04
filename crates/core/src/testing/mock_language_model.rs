//! Mock language model for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::{AssistantError, CompletionRequest, LanguageModel};

/// Replies with a canned answer, or a canned error, and records every
/// request it receives.
#[derive(Debug)]
pub struct MockLanguageModel {
    reply: Result<String, String>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl MockLanguageModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, AssistantError> {
        self.requests.write().await.push(request);
        self.reply.clone().map_err(AssistantError::Model)
    }
}
