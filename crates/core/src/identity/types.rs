use serde::{Deserialize, Serialize};
use std::fmt;

use super::IdentityError;

/// An authenticated user. Signal reads and writes are keyed by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: String,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Result<Self, IdentityError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(IdentityError::InvalidUserId(user_id));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_identity_rejects_blank() {
        assert!(UserIdentity::new("").is_err());
        assert!(UserIdentity::new(" \t").is_err());
    }

    #[test]
    fn test_user_identity_serialization() {
        let identity = UserIdentity::new("user123").unwrap();
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, r#"{"user_id":"user123"}"#);

        let back: UserIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
        assert_eq!(back.to_string(), "user123");
    }
}
