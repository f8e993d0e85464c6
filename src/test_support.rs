//! In-memory GitHub double for tests.
//!
//! [`FakeGitHub`] implements [`GatewayFactory`] and hands out gateways that
//! answer from seeded tokens, profiles, closed pull requests, and flagged
//! pull requests. Every call is counted so tests can assert that cached
//! paths stay off the network.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cooldown::Keywords;
use crate::github::{
    ActivityGateway, ClosedPullRequest, GatewayFactory, GitHubError, GitHubUser,
    PersonalAccessToken,
};

/// Number of calls made to each upstream operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeCallCounts {
    /// `authenticated_login` calls.
    pub authenticated_login: usize,
    /// `user` calls.
    pub user: usize,
    /// `closed_unmerged_pull_requests` calls.
    pub closed_unmerged_pull_requests: usize,
    /// `comments_mention_keywords` calls.
    pub comments_mention_keywords: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    tokens: HashMap<String, String>,
    users: HashMap<String, DateTime<Utc>>,
    closed: HashMap<String, Vec<ClosedPullRequest>>,
    flagged: HashSet<(String, u64)>,
    calls: FakeCallCounts,
}

/// Shared handle to a seeded fake GitHub.
#[derive(Debug, Clone, Default)]
pub struct FakeGitHub {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGitHub {
    /// Creates an empty fake that rejects every token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as belonging to `login`.
    pub fn add_token(&self, token: &str, login: &str) {
        self.lock().tokens.insert(token.to_owned(), login.to_owned());
    }

    /// Registers an account created at `created_at`.
    pub fn add_user(&self, login: &str, created_at: DateTime<Utc>) {
        self.lock().users.insert(login.to_owned(), created_at);
    }

    /// Records a closed, unmerged pull request authored by `login`.
    pub fn add_closed_pull_request(&self, login: &str, pull: ClosedPullRequest) {
        self.lock()
            .closed
            .entry(login.to_owned())
            .or_default()
            .push(pull);
    }

    /// Makes keyword scans of `repo_full_name#number` report a match.
    pub fn flag_pull_request(&self, repo_full_name: &str, number: u64) {
        self.lock()
            .flagged
            .insert((repo_full_name.to_owned(), number));
    }

    /// Calls made so far across every gateway handed out.
    #[must_use]
    pub fn calls(&self) -> FakeCallCounts {
        self.lock().calls
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GatewayFactory for FakeGitHub {
    fn for_token(
        &self,
        token: &PersonalAccessToken,
    ) -> Result<Arc<dyn ActivityGateway>, GitHubError> {
        Ok(Arc::new(FakeGateway {
            hub: self.clone(),
            token: token.value().to_owned(),
        }))
    }
}

/// Gateway bound to one caller token.
#[derive(Debug)]
struct FakeGateway {
    hub: FakeGitHub,
    token: String,
}

#[async_trait]
impl ActivityGateway for FakeGateway {
    async fn authenticated_login(&self) -> Result<String, GitHubError> {
        let mut state = self.hub.lock();
        state.calls.authenticated_login += 1;
        state
            .tokens
            .get(&self.token)
            .cloned()
            .ok_or_else(|| GitHubError::Authentication {
                message: "Bad credentials".to_owned(),
            })
    }

    async fn user(&self, login: &str) -> Result<GitHubUser, GitHubError> {
        let mut state = self.hub.lock();
        state.calls.user += 1;
        state
            .users
            .get(login)
            .map(|created_at| GitHubUser {
                login: login.to_owned(),
                created_at: *created_at,
            })
            .ok_or_else(|| GitHubError::Api {
                message: format!("fetch user {login}: Not Found"),
            })
    }

    async fn closed_unmerged_pull_requests(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClosedPullRequest>, GitHubError> {
        let mut state = self.hub.lock();
        state.calls.closed_unmerged_pull_requests += 1;
        Ok(state
            .closed
            .get(login)
            .map(|pulls| {
                pulls
                    .iter()
                    .filter(|pull| pull.closed_at.is_none_or(|closed_at| closed_at >= since))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn comments_mention_keywords(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        _pr_author: &str,
        keywords: &Keywords,
    ) -> Result<bool, GitHubError> {
        let mut state = self.hub.lock();
        state.calls.comments_mention_keywords += 1;
        Ok(!keywords.is_empty()
            && state
                .flagged
                .contains(&(repo_full_name.to_owned(), pr_number)))
    }
}
