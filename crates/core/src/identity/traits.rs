use async_trait::async_trait;
use thiserror::Error;

use super::types::UserIdentity;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("Identity service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Resolves who the current user is, if anyone.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for an anonymous visitor.
    async fn current_user(&self) -> Result<Option<UserIdentity>, IdentityError>;

    /// Name of this provider
    fn provider_name(&self) -> &'static str;
}
