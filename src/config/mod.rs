//! Service configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in service defaults
//! 2. **Configuration file** – `.pr-cooldown.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `PR_COOLDOWN_PORT`,
//!    `PR_COOLDOWN_DATABASE_URL`, and so on
//! 4. **Command-line arguments** – `--port`/`-p`, `--database-url`, ...
//!
//! # Configuration File
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! database_url = "/var/lib/pr-cooldown/cooldown.db"
//! cache_ttl_seconds = 86400
//! token_cache_ttl_seconds = 300
//! request_timeout_seconds = 30
//! github_api_url = "https://api.github.com"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "cooldown.db";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 86_400;
const DEFAULT_TOKEN_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// A configuration value that cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The named field holds an unusable value.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Configuration key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Service configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use pr_cooldown::CooldownConfig;
///
/// let config = CooldownConfig::load().expect("failed to load configuration");
/// config.validate().expect("configuration should be usable");
/// let addr = config.socket_addr().expect("listen address");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_COOLDOWN",
    discovery(
        dotfile_name = ".pr-cooldown.toml",
        config_file_name = "pr-cooldown.toml",
        app_name = "pr-cooldown"
    )
)]
pub struct CooldownConfig {
    /// IP address to listen on.
    ///
    /// Can be provided via:
    /// - CLI: `--host <ADDR>`
    /// - Environment: `PR_COOLDOWN_HOST`
    /// - Config file: `host = "..."`
    #[ortho_config()]
    pub host: String,

    /// TCP port to listen on.
    ///
    /// Can be provided via:
    /// - CLI: `--port <PORT>` or `-p <PORT>`
    /// - Environment: `PR_COOLDOWN_PORT`
    /// - Config file: `port = 8080`
    #[ortho_config(cli_short = 'p')]
    pub port: u16,

    /// `SQLite` database path holding caches and cooldown state.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `PR_COOLDOWN_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config()]
    pub database_url: String,

    /// How long cached profiles and pull request activity stay fresh, in
    /// seconds. Defaults to 24 hours.
    #[ortho_config()]
    pub cache_ttl_seconds: u64,

    /// How long a validated bearer token is trusted without asking GitHub
    /// again, in seconds. Defaults to 5 minutes.
    #[ortho_config()]
    pub token_cache_ttl_seconds: u64,

    /// Deadline for a single check, in seconds. An expired check is
    /// cancelled and answered with an internal error.
    #[ortho_config()]
    pub request_timeout_seconds: u64,

    /// GitHub REST API base URL. Override for GitHub Enterprise.
    #[ortho_config()]
    pub github_api_url: String,

    /// Runs database migrations and exits.
    ///
    /// Can be provided via:
    /// - CLI: `--migrate-db`
    /// - Config file: `migrate_db = true`
    #[ortho_config()]
    pub migrate_db: bool,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            token_cache_ttl_seconds: DEFAULT_TOKEN_CACHE_TTL_SECONDS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            github_api_url: DEFAULT_GITHUB_API_URL.to_owned(),
            migrate_db: false,
        }
    }
}

impl CooldownConfig {
    /// Checks every field that has a typed accessor.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.cache_ttl()?;
        self.token_cache_ttl()?;
        self.request_timeout()?;
        self.github_api_url()?;
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database_url",
                message: "must not be blank".to_owned(),
            });
        }
        Ok(())
    }

    /// Listen address built from `host` and `port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|error| ConfigError::Invalid {
                field: "host",
                message: format!("{error}: {}", self.host),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Freshness window for cached upstream data.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is zero.
    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        non_zero_seconds("cache_ttl_seconds", self.cache_ttl_seconds)
    }

    /// Lifetime of a validated token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is zero.
    pub fn token_cache_ttl(&self) -> Result<Duration, ConfigError> {
        non_zero_seconds("token_cache_ttl_seconds", self.token_cache_ttl_seconds)
    }

    /// Deadline for one check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        non_zero_seconds("request_timeout_seconds", self.request_timeout_seconds)
    }

    /// Parsed GitHub API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the URL does not parse or is not
    /// HTTP(S).
    pub fn github_api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.github_api_url.trim()).map_err(|error| ConfigError::Invalid {
            field: "github_api_url",
            message: error.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "github_api_url",
                message: format!("unsupported scheme: {}", url.scheme()),
            });
        }
        Ok(url)
    }
}

fn non_zero_seconds(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::Invalid {
            field,
            message: "must be greater than zero".to_owned(),
        });
    }
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests;
