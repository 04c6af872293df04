mod anonymous;
mod fixed;
mod traits;
mod types;

pub use anonymous::*;
pub use fixed::*;
pub use traits::*;
pub use types::*;

use crate::config::IdentityConfig;

/// Factory function to create an identity provider from config
pub fn create_identity_provider(
    config: &IdentityConfig,
) -> Result<Box<dyn IdentityProvider>, IdentityError> {
    match config.user_id.as_deref() {
        None => Ok(Box::new(AnonymousIdentity::new())),
        Some(user_id) => {
            let identity = UserIdentity::new(user_id)?;
            Ok(Box::new(FixedIdentity::new(identity)))
        }
    }
}
