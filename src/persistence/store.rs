//! Read/write contract for cached upstream data and cooldown state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cooldown::{Cooldown, PullRequestActivity, UserCache};

use super::PersistenceError;

/// Durable store behind the decision engine.
///
/// Implementations must make each individual write atomic. The engine never
/// holds a store-level lock between a read and the write that follows it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Returns the cached profile for `login`, if any.
    async fn user_cache(&self, login: &str) -> Result<Option<UserCache>, PersistenceError>;

    /// Inserts or replaces the cached profile for `user.login`.
    async fn save_user_cache(&self, user: &UserCache) -> Result<(), PersistenceError>;

    /// Returns cached activity for `login` with `closed_at >= since`, newest
    /// closure first. Records without a closure time are excluded.
    async fn pull_request_activity(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequestActivity>, PersistenceError>;

    /// Upserts each record by `(login, repo_full_name, pr_number)`.
    async fn save_pull_request_activity(
        &self,
        activity: &[PullRequestActivity],
    ) -> Result<(), PersistenceError>;

    /// Returns the cooldown record for `login`, if one was ever created.
    async fn cooldown(&self, login: &str) -> Result<Option<Cooldown>, PersistenceError>;

    /// Inserts or replaces the cooldown record for `cooldown.login`.
    async fn save_cooldown(&self, cooldown: &Cooldown) -> Result<(), PersistenceError>;
}
