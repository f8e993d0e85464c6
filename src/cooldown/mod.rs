//! Cooldown domain model.
//!
//! Account age tiers, the records cached per login, the escalation ladder,
//! and the check request/response contract. Everything here is pure data and
//! arithmetic; I/O lives in [`crate::evaluator`] and its collaborators.

mod escalation;
mod keywords;
mod models;
mod request;
mod tier;

pub use escalation::{EscalationLadder, escalate};
pub use keywords::Keywords;
pub use models::{
    ActivityState, CheckResponse, Cooldown, CooldownHistoryEntry, PullRequestActivity, UserCache,
    Verdict,
};
pub use request::{CheckParams, CheckRequest, DEFAULT_LOOKBACK_DAYS, ValidationError};
pub use tier::{AccountAgeTier, Thresholds, TierThresholds};
