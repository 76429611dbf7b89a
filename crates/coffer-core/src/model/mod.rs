pub mod datastream;
pub mod object;
pub mod relationship;

pub use datastream::{Datastream, DatastreamKind};
pub use object::{DigitalObject, ObjectState};
pub use relationship::{Predicate, RelTarget, Relationship};
