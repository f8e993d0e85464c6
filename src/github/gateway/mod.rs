//! Upstream data gateways.
//!
//! [`ActivityGateway`] is the read contract the evaluator and credential
//! cache depend on; [`GatewayFactory`] builds one gateway per caller token.
//! The Octocrab implementations handle real HTTP requests.

mod activity;
mod error_mapping;

pub use activity::{OctocrabActivityGateway, OctocrabGatewayFactory};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cooldown::Keywords;
use crate::github::error::GitHubError;
use crate::github::models::{ClosedPullRequest, GitHubUser};
use crate::github::token::PersonalAccessToken;

/// Read access to GitHub profile and pull request history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Login owning the token the gateway was built with.
    async fn authenticated_login(&self) -> Result<String, GitHubError>;

    /// Profile of `login`.
    async fn user(&self, login: &str) -> Result<GitHubUser, GitHubError>;

    /// Closed, unmerged pull requests authored by `login` across all
    /// repositories, closed at or after `since`.
    async fn closed_unmerged_pull_requests(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClosedPullRequest>, GitHubError>;

    /// True if any comment on the pull request not written by `pr_author`
    /// matches one of `keywords`.
    async fn comments_mention_keywords(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        pr_author: &str,
        keywords: &Keywords,
    ) -> Result<bool, GitHubError>;
}

/// Builds a gateway that authenticates as the presented token.
#[cfg_attr(test, mockall::automock)]
pub trait GatewayFactory: Send + Sync {
    /// Returns a gateway acting on behalf of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when a client cannot be constructed.
    fn for_token(
        &self,
        token: &PersonalAccessToken,
    ) -> Result<Arc<dyn ActivityGateway>, GitHubError>;
}
