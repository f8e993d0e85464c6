//! Bearer credential validation with a short-lived memo.
//!
//! A token is validated by asking upstream who it belongs to. Successful
//! answers are remembered for a configurable TTL so repeated checks from the
//! same automation do not each spend an upstream call. Failures are never
//! remembered. Two first-time callers racing with the same token may both
//! validate upstream; the call is side-effect free, so the duplicate is
//! tolerated.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::github::{ActivityGateway, GitHubError, PersonalAccessToken};

/// Credential failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No usable bearer token was presented.
    #[error("missing or invalid Authorization header")]
    MissingCredential,

    /// Upstream refused the token.
    #[error("invalid GitHub token")]
    Rejected {
        /// Why validation failed.
        #[source]
        source: GitHubError,
    },
}

#[derive(Debug, Clone)]
struct CachedIdentity {
    login: String,
    expires_at: DateTime<Utc>,
}

/// Memo of validated tokens keyed by the raw token string.
#[derive(Debug)]
pub struct CredentialCache {
    ttl: TimeDelta,
    entries: RwLock<HashMap<String, CachedIdentity>>,
}

impl CredentialCache {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the login owning `token`, validating upstream on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] when upstream refuses the token.
    pub async fn validate(
        &self,
        token: &PersonalAccessToken,
        gateway: &dyn ActivityGateway,
    ) -> Result<String, AuthError> {
        self.validate_at(token, gateway, Utc::now()).await
    }

    /// [`validate`](Self::validate) with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] when upstream refuses the token.
    pub async fn validate_at(
        &self,
        token: &PersonalAccessToken,
        gateway: &dyn ActivityGateway,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if let Some(login) = self.cached_login(token, now).await {
            return Ok(login);
        }

        let login = gateway
            .authenticated_login()
            .await
            .map_err(|source| AuthError::Rejected { source })?;

        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.write().await;
        entries.retain(|_, identity| identity.expires_at > now);
        entries.insert(
            token.value().to_owned(),
            CachedIdentity {
                login: login.clone(),
                expires_at,
            },
        );
        Ok(login)
    }

    async fn cached_login(
        &self,
        token: &PersonalAccessToken,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(token.value())
            .filter(|identity| identity.expires_at > now)
            .map(|identity| identity.login.clone())
    }
}
