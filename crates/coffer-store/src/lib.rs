//! Coffer Store - backend implementations
//!
//! Concrete implementations of the `coffer-core` collaborator
//! contracts:
//! - [`memory::MemoryStore`] / [`memory::MemoryIndex`] - mutex-guarded
//!   in-memory pair for tests and embedding
//! - [`sqlite::SqliteStore`] / [`sqlite::SqliteIndex`] - a single
//!   SQLite database holding objects, datastreams, and index
//!   documents, kept current by an embedded migration runner

pub mod errors;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::{MemoryIndex, MemoryStore};
pub use sqlite::{open_sqlite, SqliteIndex, SqliteStore};
