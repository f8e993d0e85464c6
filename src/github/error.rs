//! Error types exposed by the GitHub upstream layer.

use thiserror::Error;

/// Errors surfaced while talking to GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The bearer token was blank.
    #[error("personal access token is required")]
    MissingToken,

    /// The configured API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// A repository name was not of the form `owner/repo`.
    #[error("invalid repository name: {name}")]
    InvalidRepository {
        /// The offending repository name.
        name: String,
    },

    /// The token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub throttled the caller.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}
