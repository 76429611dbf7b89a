//! Migration framework
//!
//! Provides:
//! - Embedded SQL migrations
//! - Idempotent application with checksums

mod embedded;
mod runner;

pub use runner::apply_migrations;
