//! Durable cache and cooldown state.
//!
//! The decision engine talks to storage only through [`CooldownStore`]. The
//! production implementation is a local `SQLite` database whose schema is
//! managed with Diesel migrations, so a fresh file can be created and
//! upgraded consistently with `--migrate-db`.

mod error;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod migrator;
mod sqlite;
mod store;

pub use error::PersistenceError;
#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryCooldownStore;
pub use migrator::{CURRENT_SCHEMA_VERSION, MIGRATIONS, SchemaVersion, migrate_database};
pub use sqlite::SqliteCooldownStore;
#[cfg(test)]
pub use store::MockCooldownStore;
pub use store::CooldownStore;
