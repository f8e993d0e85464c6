//! Scenario state and shared utilities for cooldown escalation BDD tests.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pr_cooldown::persistence::SqliteCooldownStore;
use pr_cooldown::test_support::FakeGitHub;
use pr_cooldown::{CheckResponse, EvaluationError};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

#[derive(ScenarioState, Default)]
pub(crate) struct EscalationState {
    pub(crate) temp_dir: Slot<TempDir>,
    pub(crate) store: Slot<SqliteCooldownStore>,
    pub(crate) hub: Slot<FakeGitHub>,
    pub(crate) ladder: Slot<Vec<u32>>,
    pub(crate) login: Slot<String>,
    pub(crate) checked_at: Slot<DateTime<Utc>>,
    pub(crate) response: Slot<CheckResponse>,
    pub(crate) error: Slot<EvaluationError>,
}

/// Clock reading every scenario starts from.
pub(crate) fn scenario_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("scenario start should be a valid timestamp"))
}

/// `days` whole days after [`scenario_start`].
pub(crate) fn days_after_start(days: u32) -> DateTime<Utc> {
    scenario_start() + TimeDelta::days(i64::from(days))
}

/// `days` whole days before [`scenario_start`].
pub(crate) fn days_before_start(days: u32) -> DateTime<Utc> {
    scenario_start() - TimeDelta::days(i64::from(days))
}

/// Fake GitHub for the scenario, created on first use.
pub(crate) fn hub(state: &EscalationState) -> FakeGitHub {
    if let Some(hub) = state.hub.with_ref(Clone::clone) {
        return hub;
    }
    let hub = FakeGitHub::new();
    state.hub.set(hub.clone());
    hub
}
