//! Schema management for the cooldown database.
//!
//! Migrations are embedded at compile time and applied on startup. WAL
//! journaling is switched on here; the mode persists in the database file,
//! so later connections inherit it.

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::connection::SimpleConnection;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::PersistenceError;

/// Embedded Diesel migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Version of the newest embedded migration.
pub const CURRENT_SCHEMA_VERSION: &str = "20251101000000";

/// Latest applied migration version, as Diesel records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    /// Borrow the version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Brings the database at `database_url` up to [`CURRENT_SCHEMA_VERSION`].
///
/// Safe to run repeatedly; a database that is already current only has its
/// version re-read and re-reported.
///
/// # Errors
///
/// Returns [`PersistenceError`] when the database cannot be opened, migrations
/// fail, or the resulting schema version cannot be read.
pub fn migrate_database(
    database_url: &str,
    telemetry: &dyn TelemetrySink,
) -> Result<SchemaVersion, PersistenceError> {
    let mut connection = open_for_migration(database_url)?;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| PersistenceError::MigrationFailed {
            message: error.to_string(),
        })?
        .len();

    let version = latest_applied_version(&mut connection)?;
    tracing::info!(
        applied,
        schema_version = version.as_str(),
        "cooldown database schema is current"
    );
    telemetry.record(TelemetryEvent::SchemaVersionRecorded {
        schema_version: version.as_str().to_owned(),
    });
    Ok(version)
}

fn open_for_migration(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    let target = database_url.trim();
    if target.is_empty() {
        return Err(PersistenceError::BlankDatabaseUrl);
    }

    let mut connection =
        SqliteConnection::establish(target).map_err(|error| PersistenceError::ConnectionFailed {
            message: error.to_string(),
        })?;
    connection
        .batch_execute("PRAGMA journal_mode = WAL;")
        .map_err(|error| PersistenceError::PragmaFailed {
            message: error.to_string(),
        })?;
    Ok(connection)
}

#[derive(Debug, QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

fn latest_applied_version(
    connection: &mut SqliteConnection,
) -> Result<SchemaVersion, PersistenceError> {
    sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version DESC LIMIT 1;")
        .get_result::<VersionRow>(connection)
        .optional()
        .map_err(|error| PersistenceError::SchemaVersionQueryFailed {
            message: error.to_string(),
        })?
        .map(|row| SchemaVersion(row.version))
        .ok_or(PersistenceError::MissingSchemaVersion)
}
