//! Backend collaborator contracts
//!
//! The engine persists against two independent backends: an object
//! store holding objects and their datastreams, and a search index
//! holding projected documents. Both are consumed through the traits
//! here; transports, retries, and timeouts are entirely the
//! implementations' concern. Every call is blocking
//! (synchronous-or-failed).
//!
//! Contract conventions, shared by all implementations:
//! - Lookup misses return `Ok(None)` / `Ok(false)`, never an error.
//! - Errors propagate unmodified; the core performs no retry.
//! - Methods take `&self`; implementations use interior mutability.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DigitalObject, ObjectState, Predicate};
use coffer_core_types::schema::{CREATE_DATE_FIELD, ID_FIELD, MODIFIED_DATE_FIELD, MODEL_FIELD};
use coffer_core_types::Pid;

/// Result type alias for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Transport/storage failure raised by a backend implementation
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// A record the operation requires is absent
    #[error("backend record not found: {0}")]
    NotFound(String),

    /// I/O or connection failure
    #[error("backend I/O failure: {0}")]
    Io(String),

    /// A stored record failed to decode
    #[error("backend record corrupt: {0}")]
    Corrupt(String),

    /// Any other backend-reported failure
    #[error("{0}")]
    Message(String),
}

/// Object attributes as fetched from (or stamped by) the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProfile {
    pub pid: Pid,
    pub label: String,
    pub state: ObjectState,
    pub owner_id: String,
    pub create_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
}

/// One row of the object store's datastream manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastreamProfile {
    pub dsid: String,
    pub label: String,
    pub mime_type: Option<String>,
    pub control_group: String,
    pub size: Option<u64>,
    pub checksum: Option<String>,
}

/// An inbound assertion discovered through the index: `source` asserts
/// `predicate` pointing at the queried target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipAssertion {
    pub source: Pid,
    pub predicate: Predicate,
}

/// Object store contract
///
/// Owns pids (minting) and the native object/datastream records. The
/// store stamps `create_date`/`modified_date` on every object write and
/// reports them back through the returned profile.
pub trait ObjectStore: Send + Sync {
    /// Mint a fresh, never-used pid
    fn mint_pid(&self) -> BackendResult<Pid>;

    /// Fetch an object's attributes; `Ok(None)` if absent
    fn fetch_object(&self, pid: &Pid) -> BackendResult<Option<ObjectProfile>>;

    /// Fetch the datastream manifest of a persisted object
    fn fetch_datastream_manifest(&self, pid: &Pid) -> BackendResult<Vec<DatastreamProfile>>;

    /// Fetch one datastream's raw content; `Ok(None)` if absent
    fn fetch_datastream_content(&self, pid: &Pid, dsid: &str) -> BackendResult<Option<Vec<u8>>>;

    /// Write the object's attributes, returning the stamped profile
    fn save_object(&self, object: &DigitalObject) -> BackendResult<ObjectProfile>;

    /// Write one datastream (attributes and content)
    fn save_datastream(
        &self,
        pid: &Pid,
        profile: &DatastreamProfile,
        content: &[u8],
    ) -> BackendResult<()>;

    /// Remove the object and all its datastreams; `true` if it existed
    fn delete_object(&self, pid: &Pid) -> BackendResult<bool>;
}

/// Search index contract
pub trait SearchIndex: Send + Sync {
    /// Look up the document for a pid; `Ok(None)` on a miss
    fn query(&self, pid: &Pid) -> BackendResult<Option<IndexDocument>>;

    /// Upsert a document
    fn update(&self, document: &IndexDocument) -> BackendResult<()>;

    /// Delete the document for a pid; `true` if it existed
    fn delete(&self, pid: &Pid) -> BackendResult<bool>;

    /// All assertions in the index pointing at the given target URI,
    /// across every relationship field.
    fn query_relationships_to(&self, target_uri: &str)
        -> BackendResult<Vec<RelationshipAssertion>>;
}

/// The generic object-record document
///
/// A fixed field set (`id`, `system_create_date`,
/// `system_modified_date`, `active_fedora_model`) plus
/// per-metadata-datastream and relationship fields, consumed
/// identically by the object store's envelope and the search index's
/// schema. Field order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument {
    fields: BTreeMap<String, Vec<String>>,
}

impl IndexDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a field's values with a single value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), vec![value.into()]);
    }

    /// Append one value to a field
    pub fn append(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    /// First value of a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values of a field
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate fields in deterministic (name) order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document's object identifier field
    pub fn id(&self) -> Option<&str> {
        self.first(ID_FIELD)
    }

    pub fn create_date(&self) -> Option<&str> {
        self.first(CREATE_DATE_FIELD)
    }

    pub fn modified_date(&self) -> Option<&str> {
        self.first(MODIFIED_DATE_FIELD)
    }

    pub fn model(&self) -> Option<&str> {
        self.first(MODEL_FIELD)
    }

    /// Relationship fields (`rel_*`) and their target URIs
    pub fn relationship_fields(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields
            .iter()
            .filter(|(name, _)| name.starts_with(coffer_core_types::schema::REL_FIELD_PREFIX))
    }
}
