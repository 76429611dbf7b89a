//! Coffer Core - datastream reconciliation engine
//!
//! This crate provides the in-memory semantics of the coffer digital
//! object model:
//! - DigitalObject and Datastream models with per-datastream dirty
//!   tracking
//! - Collision-free datastream id generation from name patterns
//! - Class-scoped datastream registries (static specs and named groups)
//! - The insertion-ordered datastream collection with backend manifest
//!   reconciliation
//! - The outbound relationship graph stored inside the reserved
//!   `RELS-EXT` datastream
//! - Index/XML projection of the object-record field set
//! - The backend collaborator contracts (object store, search index)
//!
//! Persistence orchestration against concrete backends lives in
//! `coffer-engine`; backend implementations live in `coffer-store`.

pub mod backend;
pub mod collection;
pub mod dsid;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod registry;
pub mod relations;
pub mod render;

// Re-export commonly used types
pub use backend::{IndexDocument, ObjectStore, SearchIndex};
pub use collection::{AddOptions, DatastreamCollection, GroupAddOptions};
pub use errors::{CofferError, Result};
pub use model::{Datastream, DatastreamKind, DigitalObject, ObjectState, Predicate, RelTarget};
pub use registry::{GroupSpec, ObjectType, ObjectTypeBuilder};
pub use relations::RemoveMissingPolicy;
