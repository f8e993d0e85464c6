//! Check request payload and its validated parameter object.
//!
//! Defaults for the lookback window, escalation ladder, and tier thresholds
//! are applied here, at the validation boundary, so the evaluator only ever
//! sees fully populated parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::escalation::EscalationLadder;
use super::keywords::Keywords;
use super::tier::{AccountAgeTier, Thresholds, TierThresholds};

/// Lookback window applied when the request asks for none.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Raw `POST /check` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckRequest {
    /// Repository receiving the pull request (`owner/repo`).
    pub repo: String,
    /// Number of the incoming pull request.
    pub pr_number: i64,
    /// Login of the pull request author.
    pub pr_author: String,
    /// Days of closed-PR history to count; non-positive means the default.
    pub lookback_days: i64,
    /// Cooldown days per escalation level; empty means the default ladder.
    pub escalation_tiers: Vec<u32>,
    /// Comment keywords that flag a closed pull request.
    pub keywords: Vec<String>,
    /// Per-tier thresholds; absent means the default table.
    pub thresholds: Option<BTreeMap<AccountAgeTier, Thresholds>>,
}

/// Request validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent, blank, or not positive.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },
}

/// Fully defaulted parameters for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckParams {
    /// Author being evaluated.
    pub login: String,
    /// Repository receiving the pull request.
    pub repo: String,
    /// Incoming pull request number.
    pub pr_number: u64,
    /// Lookback window in days.
    pub lookback_days: u32,
    /// Escalation ladder.
    pub ladder: EscalationLadder,
    /// Keywords; empty disables comment scanning.
    pub keywords: Keywords,
    /// Per-tier thresholds.
    pub thresholds: TierThresholds,
}

impl CheckRequest {
    /// Validates required fields and fills in defaults.
    ///
    /// Fields are checked in the order `pr_author`, `repo`, `pr_number`.
    /// GitHub logins are case-insensitive, so `pr_author` is lower-cased to
    /// key every cache and cooldown record the same way.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the first missing
    /// required field.
    pub fn validate(self) -> Result<CheckParams, ValidationError> {
        let login = required_text(&self.pr_author, "pr_author")?.to_ascii_lowercase();
        let repo = required_text(&self.repo, "repo")?;
        let pr_number = u64::try_from(self.pr_number)
            .ok()
            .filter(|number| *number > 0)
            .ok_or(ValidationError::MissingField { field: "pr_number" })?;

        let lookback_days = if self.lookback_days > 0 {
            u32::try_from(self.lookback_days).unwrap_or(u32::MAX)
        } else {
            DEFAULT_LOOKBACK_DAYS
        };

        Ok(CheckParams {
            login,
            repo,
            pr_number,
            lookback_days,
            ladder: EscalationLadder::new(self.escalation_tiers).unwrap_or_default(),
            keywords: Keywords::new(&self.keywords),
            thresholds: self
                .thresholds
                .map(TierThresholds::new)
                .unwrap_or_default(),
        })
    }
}

fn required_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}
