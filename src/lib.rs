//! PR cooldown decision service.
//!
//! Decides whether a pull request author may keep contributing or should sit
//! out a cooldown, based on their recent closed-and-unmerged pull requests,
//! reviewer keyword flags, account age, and an escalating penalty ladder.
//! GitHub data is cached in `SQLite` and refreshed only when stale.

pub mod api;
pub mod auth;
pub mod config;
pub mod cooldown;
pub mod evaluator;
pub mod github;
pub mod persistence;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use auth::{AuthError, CredentialCache};
pub use config::{ConfigError, CooldownConfig};
pub use cooldown::{CheckRequest, CheckResponse, Verdict};
pub use evaluator::{EvaluationError, Evaluator, EvaluatorSettings};
pub use github::{GitHubError, OctocrabGatewayFactory, PersonalAccessToken};
pub use persistence::{PersistenceError, SqliteCooldownStore, migrate_database};
