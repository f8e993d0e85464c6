//! Maps Octocrab failures onto [`GitHubError`].

use http::StatusCode;

use crate::github::error::GitHubError;

const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Rate limiting arrives as 403 or 429 with a message or documentation URL
/// that mentions the limit.
fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let throttling_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );
    let mentions_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    throttling_status && mentions_limit
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GitHubError {
    if let octocrab::Error::GitHub { source, .. } = error {
        let status = source.status_code;
        let message = &source.message;
        if is_rate_limit_error(source) {
            return GitHubError::RateLimitExceeded {
                message: format!("{operation} failed: {message}"),
            };
        }
        if is_auth_failure(status) {
            return GitHubError::Authentication {
                message: format!("{operation} failed: GitHub returned {status} {message}"),
            };
        }
        return GitHubError::Api {
            message: format!("{operation} failed with status {status}: {message}"),
        };
    }

    if is_network_error(error) {
        return GitHubError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    GitHubError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
