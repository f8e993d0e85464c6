//! Blocking Diesel queries for the `SQLite` store.
//!
//! Timestamps are persisted as unix seconds; sub-second precision is dropped.

use chrono::{DateTime, Utc};
use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::cooldown::{
    ActivityState, Cooldown, CooldownHistoryEntry, PullRequestActivity, UserCache,
};
use crate::persistence::PersistenceError;

const USER_CACHE_TABLE: &str = "user_cache";
const ACTIVITY_TABLE: &str = "pr_activity_cache";
const COOLDOWNS_TABLE: &str = "cooldowns";

#[derive(Debug, QueryableByName)]
struct UserCacheRow {
    #[diesel(sql_type = Text)]
    login: String,
    #[diesel(sql_type = BigInt)]
    account_created_at: i64,
    #[diesel(sql_type = BigInt)]
    cached_at: i64,
}

#[derive(Debug, QueryableByName)]
struct ActivityRow {
    #[diesel(sql_type = Text)]
    login: String,
    #[diesel(sql_type = Text)]
    repo_full_name: String,
    #[diesel(sql_type = BigInt)]
    pr_number: i64,
    #[diesel(sql_type = Text)]
    state: String,
    #[diesel(sql_type = Bool)]
    keyword_flagged: bool,
    #[diesel(sql_type = Nullable<BigInt>)]
    closed_at: Option<i64>,
    #[diesel(sql_type = BigInt)]
    cached_at: i64,
}

#[derive(Debug, QueryableByName)]
struct CooldownRow {
    #[diesel(sql_type = Text)]
    login: String,
    #[diesel(sql_type = BigInt)]
    current_level: i64,
    #[diesel(sql_type = Nullable<BigInt>)]
    cooldown_until: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    last_triggered_at: Option<i64>,
    #[diesel(sql_type = Text)]
    history: String,
}

/// Activity record with every column already converted for binding.
struct ActivityWrite<'a> {
    record: &'a PullRequestActivity,
    pr_number: i64,
}

pub(super) fn select_user_cache(
    connection: &mut SqliteConnection,
    login: &str,
) -> Result<Option<UserCache>, PersistenceError> {
    let row: Option<UserCacheRow> = sql_query(
        "SELECT login, account_created_at, cached_at FROM user_cache WHERE login = ? LIMIT 1;",
    )
    .bind::<Text, _>(login)
    .get_result(connection)
    .optional()
    .map_err(|error| map_query_error(connection, USER_CACHE_TABLE, &error))?;

    row.map(|found| {
        Ok(UserCache {
            login: found.login,
            account_created_at: from_unix("account_created_at", found.account_created_at)?,
            cached_at: from_unix("cached_at", found.cached_at)?,
        })
    })
    .transpose()
}

pub(super) fn upsert_user_cache(
    connection: &mut SqliteConnection,
    user: &UserCache,
) -> Result<(), PersistenceError> {
    sql_query(
        "INSERT INTO user_cache (login, account_created_at, cached_at) \
         VALUES (?, ?, ?) \
         ON CONFLICT(login) DO UPDATE SET \
           account_created_at = excluded.account_created_at, \
           cached_at = excluded.cached_at;",
    )
    .bind::<Text, _>(&user.login)
    .bind::<BigInt, _>(user.account_created_at.timestamp())
    .bind::<BigInt, _>(user.cached_at.timestamp())
    .execute(connection)
    .map(drop)
    .map_err(|error| map_write_error(connection, USER_CACHE_TABLE, &error))
}

pub(super) fn select_activity(
    connection: &mut SqliteConnection,
    login: &str,
    since: DateTime<Utc>,
) -> Result<Vec<PullRequestActivity>, PersistenceError> {
    let rows: Vec<ActivityRow> = sql_query(
        "SELECT login, repo_full_name, pr_number, state, keyword_flagged, closed_at, cached_at \
         FROM pr_activity_cache \
         WHERE login = ? AND closed_at IS NOT NULL AND closed_at >= ? \
         ORDER BY closed_at DESC;",
    )
    .bind::<Text, _>(login)
    .bind::<BigInt, _>(since.timestamp())
    .load(connection)
    .map_err(|error| map_query_error(connection, ACTIVITY_TABLE, &error))?;

    rows.into_iter().map(activity_from_row).collect()
}

pub(super) fn upsert_activity(
    connection: &mut SqliteConnection,
    activity: &[PullRequestActivity],
) -> Result<(), PersistenceError> {
    let writes = activity
        .iter()
        .map(|record| {
            let pr_number =
                i64::try_from(record.pr_number).map_err(|_| PersistenceError::WriteFailed {
                    message: format!("pull request number {} exceeds i64", record.pr_number),
                })?;
            Ok(ActivityWrite { record, pr_number })
        })
        .collect::<Result<Vec<_>, PersistenceError>>()?;

    let result = connection.transaction::<(), diesel::result::Error, _>(|transaction| {
        for write in &writes {
            let record = write.record;
            sql_query(
                "INSERT INTO pr_activity_cache \
                 (login, repo_full_name, pr_number, state, keyword_flagged, closed_at, cached_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(login, repo_full_name, pr_number) DO UPDATE SET \
                   state = excluded.state, \
                   keyword_flagged = excluded.keyword_flagged, \
                   closed_at = excluded.closed_at, \
                   cached_at = excluded.cached_at;",
            )
            .bind::<Text, _>(&record.login)
            .bind::<Text, _>(&record.repo_full_name)
            .bind::<BigInt, _>(write.pr_number)
            .bind::<Text, _>(record.state.as_str())
            .bind::<Bool, _>(record.keyword_flagged)
            .bind::<Nullable<BigInt>, _>(record.closed_at.map(|closed_at| closed_at.timestamp()))
            .bind::<BigInt, _>(record.cached_at.timestamp())
            .execute(transaction)?;
        }
        Ok(())
    });

    result.map_err(|error| map_write_error(connection, ACTIVITY_TABLE, &error))
}

pub(super) fn select_cooldown(
    connection: &mut SqliteConnection,
    login: &str,
) -> Result<Option<Cooldown>, PersistenceError> {
    let row: Option<CooldownRow> = sql_query(
        "SELECT login, current_level, cooldown_until, last_triggered_at, history \
         FROM cooldowns WHERE login = ? LIMIT 1;",
    )
    .bind::<Text, _>(login)
    .get_result(connection)
    .optional()
    .map_err(|error| map_query_error(connection, COOLDOWNS_TABLE, &error))?;

    row.map(cooldown_from_row).transpose()
}

pub(super) fn upsert_cooldown(
    connection: &mut SqliteConnection,
    cooldown: &Cooldown,
) -> Result<(), PersistenceError> {
    let current_level =
        i64::try_from(cooldown.current_level).map_err(|_| PersistenceError::WriteFailed {
            message: format!("cooldown level {} exceeds i64", cooldown.current_level),
        })?;
    let history =
        serde_json::to_string(&cooldown.history).map_err(|error| PersistenceError::WriteFailed {
            message: format!("serialise cooldown history: {error}"),
        })?;

    sql_query(
        "INSERT INTO cooldowns \
         (login, current_level, cooldown_until, last_triggered_at, history) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(login) DO UPDATE SET \
           current_level = excluded.current_level, \
           cooldown_until = excluded.cooldown_until, \
           last_triggered_at = excluded.last_triggered_at, \
           history = excluded.history;",
    )
    .bind::<Text, _>(&cooldown.login)
    .bind::<BigInt, _>(current_level)
    .bind::<Nullable<BigInt>, _>(cooldown.cooldown_until.map(|until| until.timestamp()))
    .bind::<Nullable<BigInt>, _>(cooldown.last_triggered_at.map(|at| at.timestamp()))
    .bind::<Text, _>(history)
    .execute(connection)
    .map(drop)
    .map_err(|error| map_write_error(connection, COOLDOWNS_TABLE, &error))
}

fn activity_from_row(row: ActivityRow) -> Result<PullRequestActivity, PersistenceError> {
    let pr_number = u64::try_from(row.pr_number).map_err(|_| PersistenceError::CorruptRow {
        message: format!("pr_number is negative: {}", row.pr_number),
    })?;
    let closed_at = row
        .closed_at
        .map(|secs| from_unix("closed_at", secs))
        .transpose()?;

    Ok(PullRequestActivity {
        login: row.login,
        pr_number,
        repo_full_name: row.repo_full_name,
        state: ActivityState::parse(&row.state),
        keyword_flagged: row.keyword_flagged,
        closed_at,
        cached_at: from_unix("cached_at", row.cached_at)?,
    })
}

fn cooldown_from_row(row: CooldownRow) -> Result<Cooldown, PersistenceError> {
    let current_level =
        usize::try_from(row.current_level).map_err(|_| PersistenceError::CorruptRow {
            message: format!("current_level is out of range: {}", row.current_level),
        })?;
    let history: Vec<CooldownHistoryEntry> =
        serde_json::from_str(&row.history).map_err(|error| PersistenceError::CorruptRow {
            message: format!("history is not valid JSON: {error}"),
        })?;

    Ok(Cooldown {
        login: row.login,
        current_level,
        cooldown_until: row
            .cooldown_until
            .map(|secs| from_unix("cooldown_until", secs))
            .transpose()?,
        last_triggered_at: row
            .last_triggered_at
            .map(|secs| from_unix("last_triggered_at", secs))
            .transpose()?,
        history,
    })
}

fn from_unix(column: &str, secs: i64) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| PersistenceError::CorruptRow {
        message: format!("{column} is out of range: {secs}"),
    })
}

fn table_exists(
    connection: &mut SqliteConnection,
    table: &str,
) -> Result<bool, diesel::result::Error> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = BigInt)]
        count: i64,
    }

    let row: Row = sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;",
    )
    .bind::<Text, _>(table)
    .get_result(connection)?;

    Ok(row.count > 0)
}

fn map_error_with_schema_check<F>(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
    create_error: F,
) -> PersistenceError
where
    F: Fn(String) -> PersistenceError,
{
    match table_exists(connection, table) {
        Ok(false) => PersistenceError::SchemaNotInitialised,
        Ok(true) => create_error(error.to_string()),
        Err(check_error) => create_error(format!(
            "schema presence check failed: {check_error}; original error: {error}"
        )),
    }
}

fn map_query_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::QueryFailed { message }
    })
}

fn map_write_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::WriteFailed { message }
    })
}
