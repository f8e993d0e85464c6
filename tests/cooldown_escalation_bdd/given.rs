//! Given steps for cooldown escalation behavioural tests.

use pr_cooldown::github::ClosedPullRequest;
use pr_cooldown::migrate_database;
use pr_cooldown::persistence::SqliteCooldownStore;
use pr_cooldown::telemetry::NoopTelemetrySink;
use rstest_bdd_macros::given;

use crate::cooldown_escalation_bdd_state::{EscalationState, days_before_start, hub};
use crate::support::{create_temp_dir, database_url_in};

const REPO: &str = "acme/widgets";

#[given("a migrated cooldown database")]
fn migrated_cooldown_database(escalation_state: &EscalationState) {
    let temp_dir = create_temp_dir();
    let database_url = database_url_in(&temp_dir);
    migrate_database(&database_url, &NoopTelemetrySink)
        .unwrap_or_else(|error| panic!("migrations should apply: {error}"));
    let store = SqliteCooldownStore::new(database_url)
        .unwrap_or_else(|error| panic!("store should open: {error}"));
    escalation_state.temp_dir.set(temp_dir);
    escalation_state.store.set(store);
}

#[given("{login} opened their account {age:u32} days ago")]
fn account_opened(escalation_state: &EscalationState, login: String, age: u32) {
    let author = login.trim_matches('"');
    hub(escalation_state).add_user(author, days_before_start(age));
    escalation_state.login.set(author.to_owned());
}

#[given("{login} has {count:u32} keyword-flagged closed pull requests")]
fn flagged_pull_requests(escalation_state: &EscalationState, login: String, count: u32) {
    let author = login.trim_matches('"');
    let fake = hub(escalation_state);
    for number in 1..=u64::from(count) {
        fake.add_closed_pull_request(author, closed_pull_request(number));
        fake.flag_pull_request(REPO, number);
    }
}

#[given("{login} has {count:u32} plain closed pull requests")]
fn plain_pull_requests(escalation_state: &EscalationState, login: String, count: u32) {
    let author = login.trim_matches('"');
    let fake = hub(escalation_state);
    for offset in 1..=u64::from(count) {
        fake.add_closed_pull_request(author, closed_pull_request(100 + offset));
    }
}

#[given("the escalation ladder is {days}")]
fn escalation_ladder(escalation_state: &EscalationState, days: String) {
    let ladder = days
        .trim_matches('"')
        .split(',')
        .map(|rung| {
            rung.trim()
                .parse::<u32>()
                .unwrap_or_else(|error| panic!("ladder rung {rung:?} is not a number: {error}"))
        })
        .collect();
    escalation_state.ladder.set(ladder);
}

fn closed_pull_request(number: u64) -> ClosedPullRequest {
    ClosedPullRequest {
        repo_full_name: REPO.to_owned(),
        number,
        closed_at: Some(days_before_start(1)),
    }
}
