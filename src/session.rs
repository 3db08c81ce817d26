use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::Gateway;

/// A token-bearing gateway session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
}

/// The caller's identity, passed explicitly to every operation that needs
/// one. Anonymous callers see and create only ownerless rows.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(AuthUser),
}

impl Identity {
    pub fn authenticated(&self) -> Option<&AuthUser> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    /// The owner-scope this identity reads: `Some(user_id)` for owned rows,
    /// `None` for the anonymous partition.
    pub fn owner_id(&self) -> Option<&str> {
        self.authenticated().map(|user| user.id.as_str())
    }

    pub fn require_auth(&self) -> Result<&AuthUser> {
        self.authenticated().ok_or(Error::AuthRequired)
    }
}

pub async fn sign_up(gateway: &dyn Gateway, email: &str, password: &str) -> Result<Identity> {
    let user = gateway.sign_up(email, password).await?;
    tracing::info!("Signed up: {}", user.email);
    Ok(Identity::Authenticated(user))
}

pub async fn sign_in(gateway: &dyn Gateway, email: &str, password: &str) -> Result<Identity> {
    let user = gateway.sign_in(email, password).await?;
    tracing::info!("Signed in: {}", user.email);
    Ok(Identity::Authenticated(user))
}

/// Ends the session at the gateway. Always returns the anonymous identity;
/// signing out while anonymous is a no-op.
pub async fn sign_out(gateway: &dyn Gateway, identity: Identity) -> Result<Identity> {
    if let Identity::Authenticated(user) = &identity {
        gateway.sign_out(user).await?;
        tracing::info!("Signed out: {}", user.email);
    }
    Ok(Identity::Anonymous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_anonymous_has_no_owner() {
        let identity = Identity::Anonymous;
        assert_eq!(identity.owner_id(), None);
        assert!(identity.require_auth().is_err());
    }

    #[test]
    fn test_authenticated_owner_scope() {
        let identity = Identity::Authenticated(test_user());
        assert_eq!(identity.owner_id(), Some("user-1"));
        assert!(identity.require_auth().is_ok());
    }
}
