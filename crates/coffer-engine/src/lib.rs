//! Coffer Engine - persistence orchestration
//!
//! Coordinates the core's in-memory datastream semantics against the
//! two backends: [`Session`] wires an object store, a search index,
//! and an explicit [`EngineConfig`]; [`ObjectHandle`] owns one digital
//! object's working state and drives the two-phase create/update
//! protocol, deletion with inbound-reference cleanup, refresh, index
//! publication, and index-based loading.

pub mod config;
pub mod handle;
pub mod hook;
pub mod inbound;
pub mod indexer;
pub mod persist;
pub mod seed;
pub mod session;

pub use config::EngineConfig;
pub use handle::ObjectHandle;
pub use hook::{NoopProjectionHook, ProjectionHook};
pub use session::{open_sqlite_session, Session};
