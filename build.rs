//! Rebuilds the crate when the embedded cooldown schema changes.
//!
//! `embed_migrations!` reads `migrations/` at compile time, which Cargo does
//! not track on its own.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
