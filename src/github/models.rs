//! Data returned by the GitHub API.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public types consumed by the evaluator.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Profile fields needed to tier an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubUser {
    /// Canonical login.
    pub login: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// A closed, unmerged pull request found by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedPullRequest {
    /// `owner/repo` of the pull request.
    pub repo_full_name: String,
    /// Pull request number.
    pub number: u64,
    /// Closure time when GitHub reports one.
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: String,
    pub(super) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiAuthenticatedUser {
    pub(super) login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiIssue {
    pub(super) number: u64,
    pub(super) repository_url: String,
    pub(super) closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiComment {
    pub(super) body: Option<String>,
    pub(super) user: Option<ApiCommentAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiCommentAuthor {
    pub(super) login: Option<String>,
}

impl From<ApiUser> for GitHubUser {
    fn from(value: ApiUser) -> Self {
        Self {
            login: value.login,
            created_at: value.created_at,
        }
    }
}

impl From<ApiIssue> for ClosedPullRequest {
    fn from(value: ApiIssue) -> Self {
        Self {
            repo_full_name: repo_full_name_from_url(&value.repository_url),
            number: value.number,
            closed_at: value.closed_at,
        }
    }
}

impl ApiComment {
    pub(super) fn is_by(&self, login: &str) -> bool {
        self.user
            .as_ref()
            .and_then(|user| user.login.as_deref())
            .is_some_and(|author| author.eq_ignore_ascii_case(login))
    }
}

/// Extracts `owner/repo` from a repository API URL such as
/// `https://api.github.com/repos/cncf/automation`.
pub(super) fn repo_full_name_from_url(repository_url: &str) -> String {
    repository_url
        .split_once("/repos/")
        .map_or(repository_url, |(_, full_name)| full_name)
        .trim_end_matches('/')
        .to_owned()
}
