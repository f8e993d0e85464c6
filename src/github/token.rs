//! Bearer token wrapper.

use std::fmt;

use super::error::GitHubError;

/// Personal access token presented by a caller. Never blank.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Extracts the token from an `Authorization` header value.
    ///
    /// The scheme must be `Bearer`, compared case-insensitively.
    #[must_use]
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Self::new(token).ok()
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PersonalAccessToken(<redacted>)")
    }
}
