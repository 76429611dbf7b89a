//! YAML seed import
//!
//! Seeds describe objects, their datastreams, and their relationships
//! in a versioned YAML format. The importer drives the ordinary
//! session/save path so seeded objects go through exactly the same
//! orchestration as API callers.

mod format;
mod importer;

pub use format::{SeedDatastream, SeedObject, SeedRelationship, SeedV1};
pub use importer::import_seed;
