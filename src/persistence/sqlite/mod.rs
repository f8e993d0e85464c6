//! `SQLite` implementation of [`CooldownStore`].
//!
//! Diesel connections are synchronous, so every operation opens a connection
//! on Tokio's blocking pool, applies the per-connection PRAGMAs, and runs the
//! query there. The schema itself is created by
//! [`migrate_database`](super::migrate_database).

mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::Connection;
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;

use crate::cooldown::{Cooldown, PullRequestActivity, UserCache};

use super::{CooldownStore, PersistenceError};

const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;";

/// SQLite-backed store for profile, activity, and cooldown records.
#[derive(Debug, Clone)]
pub struct SqliteCooldownStore {
    database_url: Arc<str>,
}

impl SqliteCooldownStore {
    /// Creates a store targeting `database_url`.
    ///
    /// No connection is opened until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        let trimmed = database_url_string.trim();
        if trimmed.is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: Arc::from(trimmed),
        })
    }

    async fn run_blocking<T, F>(&self, operation: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError> + Send + 'static,
    {
        let database_url = Arc::clone(&self.database_url);
        tokio::task::spawn_blocking(move || {
            let mut connection = establish_connection(&database_url)?;
            operation(&mut connection)
        })
        .await
        .map_err(|error| PersistenceError::TaskFailed {
            message: error.to_string(),
        })?
    }
}

fn establish_connection(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    let mut connection = SqliteConnection::establish(database_url).map_err(|error| {
        PersistenceError::ConnectionFailed {
            message: error.to_string(),
        }
    })?;

    connection
        .batch_execute(CONNECTION_PRAGMAS)
        .map_err(|error| PersistenceError::PragmaFailed {
            message: error.to_string(),
        })?;

    Ok(connection)
}

#[async_trait]
impl CooldownStore for SqliteCooldownStore {
    async fn user_cache(&self, login: &str) -> Result<Option<UserCache>, PersistenceError> {
        let owned_login = login.to_owned();
        self.run_blocking(move |connection| queries::select_user_cache(connection, &owned_login))
            .await
    }

    async fn save_user_cache(&self, user: &UserCache) -> Result<(), PersistenceError> {
        let record = user.clone();
        self.run_blocking(move |connection| queries::upsert_user_cache(connection, &record))
            .await
    }

    async fn pull_request_activity(
        &self,
        login: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequestActivity>, PersistenceError> {
        let owned_login = login.to_owned();
        self.run_blocking(move |connection| {
            queries::select_activity(connection, &owned_login, since)
        })
        .await
    }

    async fn save_pull_request_activity(
        &self,
        activity: &[PullRequestActivity],
    ) -> Result<(), PersistenceError> {
        if activity.is_empty() {
            return Ok(());
        }
        let records = activity.to_vec();
        self.run_blocking(move |connection| queries::upsert_activity(connection, &records))
            .await
    }

    async fn cooldown(&self, login: &str) -> Result<Option<Cooldown>, PersistenceError> {
        let owned_login = login.to_owned();
        self.run_blocking(move |connection| queries::select_cooldown(connection, &owned_login))
            .await
    }

    async fn save_cooldown(&self, cooldown: &Cooldown) -> Result<(), PersistenceError> {
        let record = cooldown.clone();
        self.run_blocking(move |connection| queries::upsert_cooldown(connection, &record))
            .await
    }
}
