//! Then steps for cooldown escalation behavioural tests.

use chrono::TimeDelta;
use pr_cooldown::CheckResponse;
use pr_cooldown::persistence::CooldownStore;
use rstest_bdd_macros::then;

use crate::cooldown_escalation_bdd_state::{EscalationState, hub};

#[expect(clippy::expect_used, reason = "test code; panics are acceptable")]
fn response(escalation_state: &EscalationState) -> CheckResponse {
    escalation_state
        .response
        .with_ref(Clone::clone)
        .expect("no check response recorded")
}

#[then("the verdict is {verdict}")]
fn verdict_is(escalation_state: &EscalationState, verdict: String) {
    assert_eq!(
        response(escalation_state).verdict.as_str(),
        verdict.trim_matches('"')
    );
}

#[then("the cooldown level is {level:u32}")]
fn cooldown_level_is(escalation_state: &EscalationState, level: u32) {
    assert_eq!(
        response(escalation_state).cooldown_level,
        usize::try_from(level).ok()
    );
}

#[expect(clippy::expect_used, reason = "test code; panics are acceptable")]
#[then("the cooldown lasts {days:u32} days")]
fn cooldown_lasts(escalation_state: &EscalationState, days: u32) {
    let checked_at = escalation_state
        .checked_at
        .with_ref(|at| *at)
        .expect("check time not recorded");
    let until = response(escalation_state)
        .cooldown_until
        .expect("expected a bounded cooldown");
    assert_eq!(until - checked_at, TimeDelta::days(i64::from(days)));
}

#[then("the cooldown is permanent")]
fn cooldown_is_permanent(escalation_state: &EscalationState) {
    let verdict = response(escalation_state);
    assert!(verdict.cooldown_level.is_some(), "expected a cooldown");
    assert_eq!(verdict.cooldown_until, None);
}

#[then("the reason is {reason}")]
fn reason_is(escalation_state: &EscalationState, reason: String) {
    assert_eq!(
        response(escalation_state).reason.as_deref(),
        Some(reason.trim_matches('"'))
    );
}

#[then("the account is in the {tier} tier")]
fn account_tier_is(escalation_state: &EscalationState, tier: String) {
    let actual = response(escalation_state).account_age_tier;
    assert_eq!(
        actual.map(|value| value.as_str()),
        Some(tier.trim_matches('"'))
    );
}

#[expect(clippy::expect_used, reason = "test code; panics are acceptable")]
#[then("the stored history has {count:u32} entries")]
fn stored_history_has(escalation_state: &EscalationState, count: u32) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create Tokio runtime");
    let store = escalation_state
        .store
        .with_ref(Clone::clone)
        .expect("cooldown database not initialised");
    let login = escalation_state
        .login
        .with_ref(Clone::clone)
        .expect("no login checked");

    let cooldown = runtime
        .block_on(store.cooldown(&login))
        .expect("cooldown read should succeed")
        .expect("expected a stored cooldown");

    assert_eq!(
        cooldown.history.len(),
        usize::try_from(count).expect("count fits usize")
    );
}

#[then("upstream activity was fetched {count:u32} times")]
fn upstream_activity_fetched(escalation_state: &EscalationState, count: u32) {
    let calls = hub(escalation_state).calls().closed_unmerged_pull_requests;
    assert_eq!(Some(calls), usize::try_from(count).ok());
}

#[expect(clippy::expect_used, reason = "test code; panics are acceptable")]
#[then("the check fails at {operation}")]
fn check_fails_at(escalation_state: &EscalationState, operation: String) {
    let error = escalation_state
        .error
        .with_ref(ToString::to_string)
        .expect("expected the check to fail");
    assert!(
        error.starts_with(operation.trim_matches('"')),
        "unexpected error: {error}"
    );
}
