//! Signal counting and threshold comparison.

use std::fmt;

use crate::cooldown::{AccountAgeTier, ActivityState, PullRequestActivity, Thresholds};

/// Closed pull requests split into mutually exclusive buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    /// Closed PRs whose comments matched a keyword.
    pub keyword_flagged: u32,
    /// Closed PRs without a keyword match.
    pub plain_closed: u32,
}

impl SignalCounts {
    /// Counts closed records; open records are ignored.
    #[must_use]
    pub fn tally(activity: &[PullRequestActivity]) -> Self {
        activity
            .iter()
            .filter(|record| record.state == ActivityState::Closed)
            .fold(Self::default(), |mut counts, record| {
                if record.keyword_flagged {
                    counts.keyword_flagged = counts.keyword_flagged.saturating_add(1);
                } else {
                    counts.plain_closed = counts.plain_closed.saturating_add(1);
                }
                counts
            })
    }

    /// Compares the counts against `thresholds`.
    ///
    /// The keyword signal is checked first and wins when both would fire. A
    /// zero threshold never fires.
    #[must_use]
    pub const fn trigger(self, thresholds: Thresholds, tier: AccountAgeTier) -> Option<Trigger> {
        if thresholds.keyword_flagged > 0 && self.keyword_flagged >= thresholds.keyword_flagged {
            return Some(Trigger::KeywordFlagged {
                count: self.keyword_flagged,
                threshold: thresholds.keyword_flagged,
                tier,
            });
        }
        if thresholds.plain_closed > 0 && self.plain_closed >= thresholds.plain_closed {
            return Some(Trigger::PlainClosed {
                count: self.plain_closed,
                threshold: thresholds.plain_closed,
                tier,
            });
        }
        None
    }
}

/// The signal that pushed a login over its threshold.
///
/// `Display` renders the human-readable reason stored in history and returned
/// to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Too many keyword-flagged closures.
    KeywordFlagged {
        /// Observed count.
        count: u32,
        /// Threshold that was met.
        threshold: u32,
        /// Tier whose threshold applied.
        tier: AccountAgeTier,
    },
    /// Too many plain closures.
    PlainClosed {
        /// Observed count.
        count: u32,
        /// Threshold that was met.
        threshold: u32,
        /// Tier whose threshold applied.
        tier: AccountAgeTier,
    },
}

impl fmt::Display for Trigger {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeywordFlagged {
                count,
                threshold,
                tier,
            } => write!(
                formatter,
                "{count} keyword-flagged closed PRs (threshold: {threshold} for {tier} accounts)"
            ),
            Self::PlainClosed {
                count,
                threshold,
                tier,
            } => write!(
                formatter,
                "{count} closed PRs without merge (threshold: {threshold} for {tier} accounts)"
            ),
        }
    }
}
