//! Account age tiers and the per-tier thresholds that select them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Accounts younger than this are [`AccountAgeTier::New`].
const NEW_ACCOUNT_DAYS: i64 = 90;

/// Accounts at least this old are [`AccountAgeTier::Veteran`].
const VETERAN_ACCOUNT_DAYS: i64 = 2 * 365;

/// Coarse age bracket of a GitHub account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountAgeTier {
    /// Younger than 90 days.
    New,
    /// Between 90 days and two years.
    Established,
    /// Two years or older.
    Veteran,
}

impl AccountAgeTier {
    /// Derives the tier from the account creation time as seen at `now`.
    ///
    /// Boundaries are inclusive on the older side: an account exactly 90 days
    /// old is established, exactly 730 days old is a veteran.
    #[must_use]
    pub fn from_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = now.signed_duration_since(created_at);
        if age < TimeDelta::days(NEW_ACCOUNT_DAYS) {
            Self::New
        } else if age < TimeDelta::days(VETERAN_ACCOUNT_DAYS) {
            Self::Established
        } else {
            Self::Veteran
        }
    }

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Established => "established",
            Self::Veteran => "veteran",
        }
    }
}

impl fmt::Display for AccountAgeTier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Closed-PR counts at which a tier triggers a cooldown.
///
/// A zero disables the corresponding signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Keyword-flagged closures needed to trigger.
    pub keyword_flagged: u32,
    /// Plain closures needed to trigger.
    pub plain_closed: u32,
}

impl Thresholds {
    /// Applied to a tier the caller left unconfigured.
    pub const LENIENT: Self = Self::new(2, 4);

    /// Creates a threshold pair.
    #[must_use]
    pub const fn new(keyword_flagged: u32, plain_closed: u32) -> Self {
        Self {
            keyword_flagged,
            plain_closed,
        }
    }
}

/// Thresholds keyed by tier, as supplied with a check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierThresholds(BTreeMap<AccountAgeTier, Thresholds>);

impl TierThresholds {
    /// Wraps a caller-supplied mapping. Missing tiers fall back to
    /// [`Thresholds::LENIENT`] at lookup time.
    #[must_use]
    pub const fn new(thresholds: BTreeMap<AccountAgeTier, Thresholds>) -> Self {
        Self(thresholds)
    }

    /// Thresholds for `tier`, or the lenient fallback.
    #[must_use]
    pub fn for_tier(&self, tier: AccountAgeTier) -> Thresholds {
        self.0.get(&tier).copied().unwrap_or(Thresholds::LENIENT)
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self(BTreeMap::from([
            (AccountAgeTier::New, Thresholds::new(1, 2)),
            (AccountAgeTier::Established, Thresholds::new(2, 3)),
            (AccountAgeTier::Veteran, Thresholds::new(2, 4)),
        ]))
    }
}
