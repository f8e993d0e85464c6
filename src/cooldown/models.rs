//! Records cached per login and the verdict returned to callers.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::tier::AccountAgeTier;

/// Cached GitHub profile data for one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCache {
    /// GitHub login.
    pub login: String,
    /// Account creation time reported by GitHub.
    pub account_created_at: DateTime<Utc>,
    /// When the profile was fetched.
    pub cached_at: DateTime<Utc>,
}

/// Lifecycle state of a cached pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    /// Still open; cached but never counted.
    Open,
    /// Closed without merge.
    Closed,
}

impl ActivityState {
    /// Storage name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parses a storage name; unknown values are treated as open so they are
    /// never counted.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

/// A pull request authored by a login, cached with its keyword verdict.
///
/// Identified by `(login, repo_full_name, pr_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestActivity {
    /// Author login.
    pub login: String,
    /// Pull request number within the repository.
    pub pr_number: u64,
    /// `owner/repo` of the pull request.
    pub repo_full_name: String,
    /// Open or closed.
    pub state: ActivityState,
    /// Whether a non-author comment matched a configured keyword.
    pub keyword_flagged: bool,
    /// Closure time; absent while the pull request is open.
    pub closed_at: Option<DateTime<Utc>>,
    /// When this record was fetched.
    pub cached_at: DateTime<Utc>,
}

/// One escalation event in a login's cooldown history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownHistoryEntry {
    /// When the trigger fired.
    pub triggered_at: DateTime<Utc>,
    /// Human-readable trigger reason.
    pub reason: String,
    /// Ladder level assigned by this trigger.
    pub level: usize,
}

/// Escalating cooldown state for one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    /// GitHub login.
    pub login: String,
    /// Index into the escalation ladder.
    pub current_level: usize,
    /// End of the cooldown window; `None` is a permanent ban.
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Time of the most recent trigger.
    pub last_triggered_at: Option<DateTime<Utc>>,
    /// Every trigger so far, oldest first.
    pub history: Vec<CooldownHistoryEntry>,
}

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The author may contribute.
    Allow,
    /// The author is cooling down.
    Cooldown,
}

impl Verdict {
    /// Wire name of the verdict.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Cooldown => "cooldown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Verdict payload returned by `POST /check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Allow or cooldown.
    pub verdict: Verdict,
    /// Why the author is cooling down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// End of the cooldown; absent when permanent or allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Ladder level; absent when allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_level: Option<usize>,
    /// Closed PRs with a keyword match.
    pub keyword_flagged_count: u32,
    /// Closed PRs without a keyword match.
    pub plain_closed_count: u32,
    /// Tier used for threshold selection; absent on an active-cooldown
    /// short circuit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_age_tier: Option<AccountAgeTier>,
}

impl CheckResponse {
    /// Response for a login whose existing cooldown is still running.
    #[must_use]
    pub fn active_cooldown(cooldown: &Cooldown) -> Self {
        Self {
            verdict: Verdict::Cooldown,
            reason: Some(describe_active(cooldown)),
            cooldown_until: cooldown.cooldown_until,
            cooldown_level: Some(cooldown.current_level),
            keyword_flagged_count: 0,
            plain_closed_count: 0,
            account_age_tier: None,
        }
    }

    /// Response for a login that was allowed through.
    #[must_use]
    pub const fn allow(
        keyword_flagged_count: u32,
        plain_closed_count: u32,
        tier: AccountAgeTier,
    ) -> Self {
        Self {
            verdict: Verdict::Allow,
            reason: None,
            cooldown_until: None,
            cooldown_level: None,
            keyword_flagged_count,
            plain_closed_count,
            account_age_tier: Some(tier),
        }
    }
}

fn describe_active(cooldown: &Cooldown) -> String {
    cooldown.cooldown_until.map_or_else(
        || "Permanently banned".to_owned(),
        |until| {
            format!(
                "Active cooldown until {}",
                until.to_rfc3339_opts(SecondsFormat::Secs, true)
            )
        },
    )
}
