use async_trait::async_trait;

use super::{IdentityError, IdentityProvider, UserIdentity};

/// Provider that always reports the same signed-in user.
pub struct FixedIdentity {
    identity: UserIdentity,
}

impl FixedIdentity {
    pub fn new(identity: UserIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> Result<Option<UserIdentity>, IdentityError> {
        Ok(Some(self.identity.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}
