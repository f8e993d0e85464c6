//! Error types for cache and cooldown persistence.

use thiserror::Error;

/// Errors returned by the `SQLite` store and the migration runner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database URL/path was present but blank.
    #[error("database URL must not be blank")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// A connection PRAGMA could not be applied.
    #[error("failed to configure SQLite connection: {message}")]
    PragmaFailed {
        /// Error detail from the PRAGMA execution.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// The migrations completed but no schema version could be found.
    #[error("no schema version recorded after migrations ran")]
    MissingSchemaVersion,

    /// A cache table is missing; migrations have not been applied.
    #[error("database schema is not initialised (run with --migrate-db)")]
    SchemaNotInitialised,

    /// A read query failed.
    #[error("database query failed: {message}")]
    QueryFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// A write failed.
    #[error("database write failed: {message}")]
    WriteFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// A stored row could not be decoded.
    #[error("stored row is corrupt: {message}")]
    CorruptRow {
        /// Which column failed to decode and why.
        message: String,
    },

    /// The blocking database task panicked or was cancelled.
    #[error("database task failed: {message}")]
    TaskFailed {
        /// Join error detail.
        message: String,
    },

    /// The store refused the operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Why the store is unavailable.
        message: String,
    },
}
