//! The cooldown decision engine.
//!
//! A check runs five ordered steps: short-circuit on an active cooldown,
//! resolve the author's profile, resolve their closed pull requests in the
//! lookback window, compare the counted signals with the tier's thresholds,
//! then either escalate or allow. Cached data is preferred while fresh and
//! upstream is consulted only on a miss. Any store or upstream failure
//! aborts the check; there is no partial verdict.

mod locks;
mod signals;

use std::time::Duration;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use thiserror::Error;

use crate::cooldown::{
    AccountAgeTier, ActivityState, CheckParams, CheckResponse, Cooldown, PullRequestActivity,
    UserCache, Verdict, escalate,
};
use crate::github::{ActivityGateway, GitHubError};
use crate::persistence::{CooldownStore, PersistenceError};

pub use locks::{LoginGuard, LoginLocks};
pub use signals::{SignalCounts, Trigger};

/// Failure of a dependency during a check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvaluationError {
    /// A cache or cooldown read/write failed.
    #[error("{operation} failed: {source}")]
    Store {
        /// Step that failed.
        operation: String,
        /// Underlying store error.
        #[source]
        source: PersistenceError,
    },

    /// An upstream call failed.
    #[error("{operation} failed: {source}")]
    Upstream {
        /// Step that failed.
        operation: String,
        /// Underlying upstream error.
        #[source]
        source: GitHubError,
    },

    /// The check did not finish before its deadline.
    #[error("check cancelled after {timeout:?}")]
    Cancelled {
        /// Deadline that expired.
        timeout: Duration,
    },
}

fn store_error(operation: impl Into<String>) -> impl FnOnce(PersistenceError) -> EvaluationError {
    let step = operation.into();
    move |source| EvaluationError::Store {
        operation: step,
        source,
    }
}

fn upstream_error(operation: impl Into<String>) -> impl FnOnce(GitHubError) -> EvaluationError {
    let step = operation.into();
    move |source| EvaluationError::Upstream {
        operation: step,
        source,
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorSettings {
    /// How long cached profiles and activity stay fresh.
    pub cache_ttl: TimeDelta,
}

impl EvaluatorSettings {
    /// Builds settings from a standard-library TTL, saturating values that
    /// overflow `TimeDelta`.
    #[must_use]
    pub fn from_cache_ttl(cache_ttl: Duration) -> Self {
        Self {
            cache_ttl: TimeDelta::from_std(cache_ttl).unwrap_or(TimeDelta::MAX),
        }
    }
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            cache_ttl: TimeDelta::hours(24),
        }
    }
}

/// Runs checks against a store and an upstream gateway.
pub struct Evaluator<'deps, S, G>
where
    S: CooldownStore + ?Sized,
    G: ActivityGateway + ?Sized,
{
    store: &'deps S,
    gateway: &'deps G,
    settings: EvaluatorSettings,
    login_locks: Option<&'deps LoginLocks>,
}

impl<'deps, S, G> Evaluator<'deps, S, G>
where
    S: CooldownStore + ?Sized,
    G: ActivityGateway + ?Sized,
{
    /// Creates an evaluator over borrowed dependencies.
    #[must_use]
    pub const fn new(store: &'deps S, gateway: &'deps G, settings: EvaluatorSettings) -> Self {
        Self {
            store,
            gateway,
            settings,
            login_locks: None,
        }
    }

    /// Serialises checks for the same login through `login_locks`.
    #[must_use]
    pub const fn with_login_locks(mut self, login_locks: &'deps LoginLocks) -> Self {
        self.login_locks = Some(login_locks);
        self
    }

    /// Evaluates `params` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when any store or upstream call fails.
    pub async fn check(&self, params: &CheckParams) -> Result<CheckResponse, EvaluationError> {
        self.check_at(params, Utc::now()).await
    }

    /// Evaluates `params` and gives up after `timeout`.
    ///
    /// Dropping the in-flight future aborts any pending store or upstream
    /// call. Writes already committed stay committed.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Cancelled`] when the deadline expires, or
    /// the error of the failing dependency.
    pub async fn check_with_timeout(
        &self,
        params: &CheckParams,
        timeout: Duration,
    ) -> Result<CheckResponse, EvaluationError> {
        tokio::time::timeout(timeout, self.check(params))
            .await
            .map_err(|_| EvaluationError::Cancelled { timeout })?
    }

    /// Evaluates `params` as if the current time were `at`.
    ///
    /// `at` is truncated to whole seconds, the resolution the store keeps, so
    /// a record read back compares equal to the one written.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when any store or upstream call fails.
    pub async fn check_at(
        &self,
        params: &CheckParams,
        at: DateTime<Utc>,
    ) -> Result<CheckResponse, EvaluationError> {
        let now = at.trunc_subsecs(0);
        let _guard = match self.login_locks {
            Some(locks) => Some(locks.acquire(&params.login).await),
            None => None,
        };
        let login = params.login.as_str();

        let existing = self
            .store
            .cooldown(login)
            .await
            .map_err(store_error("read cooldown"))?;
        if let Some(cooldown) = existing.as_ref()
            && cooldown.is_active(now)
        {
            tracing::debug!(login, level = cooldown.current_level, "active cooldown");
            return Ok(CheckResponse::active_cooldown(cooldown));
        }

        let user = self.resolve_user(login, now).await?;
        let tier = AccountAgeTier::from_age(user.account_created_at, now);

        let activity = self.resolve_activity(params, now).await?;
        let counts = SignalCounts::tally(&activity);
        let Some(trigger) = counts.trigger(params.thresholds.for_tier(tier), tier) else {
            return Ok(CheckResponse::allow(
                counts.keyword_flagged,
                counts.plain_closed,
                tier,
            ));
        };

        let reason = trigger.to_string();
        let cooldown = escalate(existing, login, &reason, &params.ladder, now);
        self.store
            .save_cooldown(&cooldown)
            .await
            .map_err(store_error("write cooldown"))?;
        tracing::info!(
            login,
            repo = %params.repo,
            pr_number = params.pr_number,
            level = cooldown.current_level,
            %reason,
            "cooldown escalated"
        );

        Ok(escalated_response(&cooldown, reason, counts, tier))
    }

    async fn resolve_user(
        &self,
        login: &str,
        now: DateTime<Utc>,
    ) -> Result<UserCache, EvaluationError> {
        let cached = self
            .store
            .user_cache(login)
            .await
            .map_err(store_error("read user cache"))?;
        if let Some(user) = cached
            && self.is_fresh(user.cached_at, now)
        {
            tracing::debug!(login, "user cache hit");
            return Ok(user);
        }

        tracing::debug!(login, "user cache miss");
        let profile = self
            .gateway
            .user(login)
            .await
            .map_err(upstream_error("fetch user"))?;
        let user = UserCache {
            login: login.to_owned(),
            account_created_at: profile.created_at,
            cached_at: now,
        };
        self.store
            .save_user_cache(&user)
            .await
            .map_err(store_error("write user cache"))?;
        Ok(user)
    }

    async fn resolve_activity(
        &self,
        params: &CheckParams,
        now: DateTime<Utc>,
    ) -> Result<Vec<PullRequestActivity>, EvaluationError> {
        let login = params.login.as_str();
        let since = lookback_start(now, params.lookback_days);

        let cached = self
            .store
            .pull_request_activity(login, since)
            .await
            .map_err(store_error("read pull request activity"))?;
        if cached
            .first()
            .is_some_and(|newest| self.is_fresh(newest.cached_at, now))
        {
            tracing::debug!(login, records = cached.len(), "activity cache hit");
            return Ok(cached);
        }

        tracing::debug!(login, "activity cache miss");
        let pulls = self
            .gateway
            .closed_unmerged_pull_requests(login, since)
            .await
            .map_err(upstream_error("fetch closed pull requests"))?;

        let mut fetched = Vec::with_capacity(pulls.len());
        for pull in pulls {
            let keyword_flagged = if params.keywords.is_empty() {
                false
            } else {
                self.gateway
                    .comments_mention_keywords(
                        &pull.repo_full_name,
                        pull.number,
                        login,
                        &params.keywords,
                    )
                    .await
                    .map_err(upstream_error(format!(
                        "check keywords for {}#{}",
                        pull.repo_full_name, pull.number
                    )))?
            };
            let state = if pull.closed_at.is_some() {
                ActivityState::Closed
            } else {
                ActivityState::Open
            };
            fetched.push(PullRequestActivity {
                login: login.to_owned(),
                pr_number: pull.number,
                repo_full_name: pull.repo_full_name,
                state,
                keyword_flagged,
                closed_at: pull.closed_at,
                cached_at: now,
            });
        }

        if !fetched.is_empty() {
            self.store
                .save_pull_request_activity(&fetched)
                .await
                .map_err(store_error("write pull request activity"))?;
        }
        Ok(fetched)
    }

    fn is_fresh(&self, cached_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - cached_at < self.settings.cache_ttl
    }
}

/// Start of a lookback window of `days` ending at `now`, never earlier than
/// the Unix epoch.
fn lookback_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::days(i64::from(days)))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |start| {
            start.max(DateTime::<Utc>::UNIX_EPOCH)
        })
}

fn escalated_response(
    cooldown: &Cooldown,
    reason: String,
    counts: SignalCounts,
    tier: AccountAgeTier,
) -> CheckResponse {
    CheckResponse {
        verdict: Verdict::Cooldown,
        reason: Some(reason),
        cooldown_until: cooldown.cooldown_until,
        cooldown_level: Some(cooldown.current_level),
        keyword_flagged_count: counts.keyword_flagged,
        plain_closed_count: counts.plain_closed,
        account_age_tier: Some(tier),
    }
}
