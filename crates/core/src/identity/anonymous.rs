use async_trait::async_trait;

use super::{IdentityError, IdentityProvider, UserIdentity};

/// Provider for visitors who are not signed in.
pub struct AnonymousIdentity;

impl AnonymousIdentity {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnonymousIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for AnonymousIdentity {
    async fn current_user(&self) -> Result<Option<UserIdentity>, IdentityError> {
        Ok(None)
    }

    fn provider_name(&self) -> &'static str {
        "anonymous"
    }
}
