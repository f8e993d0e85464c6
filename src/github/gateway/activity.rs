//! Octocrab implementation of the activity gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Uri;
use octocrab::{Octocrab, Page};

use crate::cooldown::Keywords;
use crate::github::error::GitHubError;
use crate::github::models::{
    ApiAuthenticatedUser, ApiComment, ApiIssue, ApiUser, ClosedPullRequest, GitHubUser,
};
use crate::github::token::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;
use super::{ActivityGateway, GatewayFactory};

const PER_PAGE: &str = "100";

/// Octocrab-backed gateway.
pub struct OctocrabActivityGateway {
    client: Octocrab,
}

impl OctocrabActivityGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway authenticated with `token` against `api_base`.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, GitHubError> {
        let base_uri = api_base
            .parse::<Uri>()
            .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        let client = Octocrab::builder()
            .personal_token(token.value())
            .base_uri(base_uri)
            .map_err(|error| GitHubError::Api {
                message: format!("build client failed: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl ActivityGateway for OctocrabActivityGateway {
    async fn authenticated_login(&self) -> Result<String, GitHubError> {
        self.client
            .get::<ApiAuthenticatedUser, _, _>("/user", None::<&()>)
            .await
            .map(|user| user.login)
            .map_err(|error| map_octocrab_error("validate token", &error))
    }

    async fn user(&self, login: &str) -> Result<GitHubUser, GitHubError> {
        self.client
            .get::<ApiUser, _, _>(format!("/users/{login}"), None::<&()>)
            .await
            .map(GitHubUser::from)
            .map_err(|error| map_octocrab_error(&format!("fetch user {login}"), &error))
    }

    async fn closed_unmerged_pull_requests(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClosedPullRequest>, GitHubError> {
        let operation = format!("search closed pull requests for {login}");
        let query = format!(
            "type:pr author:{login} is:closed is:unmerged closed:>={}",
            since.format("%Y-%m-%d")
        );
        let params = [
            ("q", query.as_str()),
            ("sort", "updated"),
            ("order", "desc"),
            ("per_page", PER_PAGE),
        ];

        let first_page: Page<ApiIssue> = self
            .client
            .get("/search/issues", Some(&params))
            .await
            .map_err(|error| map_octocrab_error(&operation, &error))?;

        let issues = self
            .client
            .all_pages(first_page)
            .await
            .map_err(|error| map_octocrab_error(&operation, &error))?;

        // The search qualifier only has day granularity.
        Ok(issues
            .into_iter()
            .map(ClosedPullRequest::from)
            .filter(|pull| pull.closed_at.is_none_or(|closed_at| closed_at >= since))
            .collect())
    }

    async fn comments_mention_keywords(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        pr_author: &str,
        keywords: &Keywords,
    ) -> Result<bool, GitHubError> {
        let (owner, repo) = split_repository(repo_full_name)?;
        let operation = format!("list comments for {repo_full_name}#{pr_number}");
        let params = [
            ("sort", "created"),
            ("direction", "desc"),
            ("per_page", PER_PAGE),
        ];

        let mut page: Page<ApiComment> = self
            .client
            .get(
                format!("/repos/{owner}/{repo}/issues/{pr_number}/comments"),
                Some(&params),
            )
            .await
            .map_err(|error| map_octocrab_error(&operation, &error))?;

        loop {
            let flagged = page.items.iter().any(|comment| {
                !comment.is_by(pr_author)
                    && comment
                        .body
                        .as_deref()
                        .is_some_and(|body| keywords.matches(body))
            });
            if flagged {
                return Ok(true);
            }

            match self
                .client
                .get_page::<ApiComment>(&page.next)
                .await
                .map_err(|error| map_octocrab_error(&operation, &error))?
            {
                Some(next) => page = next,
                None => return Ok(false),
            }
        }
    }
}

fn split_repository(repo_full_name: &str) -> Result<(&str, &str), GitHubError> {
    repo_full_name
        .split_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
        .ok_or_else(|| GitHubError::InvalidRepository {
            name: repo_full_name.to_owned(),
        })
}

/// Builds an [`OctocrabActivityGateway`] per caller token.
#[derive(Debug, Clone)]
pub struct OctocrabGatewayFactory {
    api_base: String,
}

impl OctocrabGatewayFactory {
    /// Creates a factory targeting `api_base` (for example
    /// `https://api.github.com`).
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl GatewayFactory for OctocrabGatewayFactory {
    fn for_token(
        &self,
        token: &PersonalAccessToken,
    ) -> Result<Arc<dyn ActivityGateway>, GitHubError> {
        let gateway = OctocrabActivityGateway::for_token(token, &self.api_base)?;
        Ok(Arc::new(gateway))
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
