//! When steps for cooldown escalation behavioural tests.

use chrono::{DateTime, Utc};
use pr_cooldown::github::GatewayFactory;
use pr_cooldown::{CheckRequest, Evaluator, EvaluatorSettings, PersonalAccessToken};
use rstest_bdd_macros::when;

use crate::cooldown_escalation_bdd_state::{
    EscalationState, days_after_start, hub, scenario_start,
};

#[when("{login} is checked")]
fn login_is_checked(escalation_state: &EscalationState, login: String) {
    run_check(escalation_state, login.trim_matches('"'), scenario_start());
}

#[when("{login} is checked again {days:u32} days later")]
fn login_is_checked_later(escalation_state: &EscalationState, login: String, days: u32) {
    run_check(
        escalation_state,
        login.trim_matches('"'),
        days_after_start(days),
    );
}

#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
fn run_check(escalation_state: &EscalationState, login: &str, now: DateTime<Utc>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create Tokio runtime");
    let store = escalation_state
        .store
        .with_ref(Clone::clone)
        .expect("cooldown database not initialised");
    let token = PersonalAccessToken::new("ghp_escalation").expect("token should be valid");
    let gateway = hub(escalation_state)
        .for_token(&token)
        .expect("fake gateway should build");

    let params = CheckRequest {
        repo: "acme/incoming".to_owned(),
        pr_number: 7,
        pr_author: login.to_owned(),
        keywords: vec!["spam".to_owned()],
        escalation_tiers: escalation_state
            .ladder
            .with_ref(Clone::clone)
            .unwrap_or_default(),
        ..CheckRequest::default()
    }
    .validate()
    .expect("check request should validate");

    let evaluator = Evaluator::new(&store, gateway.as_ref(), EvaluatorSettings::default());
    escalation_state.login.set(login.to_owned());
    escalation_state.checked_at.set(now);
    match runtime.block_on(evaluator.check_at(&params, now)) {
        Ok(response) => escalation_state.response.set(response),
        Err(error) => escalation_state.error.set(error),
    }
}
