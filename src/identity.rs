//! Acting-user identity.
//!
//! Export filtering and import ownership both need to know who is acting.
//! The binary resolves that once at start-up; library callers can plug in
//! their own provider.

use crate::models::UserId;
use crate::{Error, Result};

/// Environment variable consulted for the acting user.
pub const USER_ID_ENV: &str = "LIFEOS_USER_ID";

/// Supplies the acting user.
pub trait IdentityProvider: Send + Sync {
    /// Returns the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when no user is signed in.
    fn current_user(&self) -> Result<UserId>;
}

/// Identity fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    /// Creates an identity for `user`.
    #[must_use]
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    /// Creates an identity with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// Picks the first non-empty candidate: flag, then environment, then
    /// configuration.
    #[must_use]
    pub fn resolve(flag: Option<&str>, env: Option<&str>, configured: Option<&str>) -> Self {
        [flag, env, configured]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map_or_else(Self::anonymous, Self::new)
    }

    /// Resolves from a flag, `LIFEOS_USER_ID` and the configured user.
    #[must_use]
    pub fn from_sources(flag: Option<&str>, configured: Option<&str>) -> Self {
        let env = std::env::var(USER_ID_ENV).ok();
        Self::resolve(flag, env.as_deref(), configured)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Result<UserId> {
        self.user.clone().ok_or_else(|| {
            Error::Unauthorized(format!(
                "no acting user; pass --user or set {USER_ID_ENV}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_precedence() {
        let id = StaticIdentity::resolve(Some("flag"), Some("env"), Some("config"));
        assert_eq!(id.current_user().unwrap().as_str(), "flag");

        let id = StaticIdentity::resolve(None, Some("env"), Some("config"));
        assert_eq!(id.current_user().unwrap().as_str(), "env");

        let id = StaticIdentity::resolve(Some("  "), None, Some("config"));
        assert_eq!(id.current_user().unwrap().as_str(), "config");
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        let err = StaticIdentity::resolve(None, None, None)
            .current_user()
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
