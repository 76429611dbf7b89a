use thiserror::Error;

use crate::backend::BackendError;
use coffer_core_types::PidParseError;

/// Result type alias using CofferError
pub type Result<T> = std::result::Result<T, CofferError>;

/// Canonical error type for the coffer engine
///
/// Validation errors are raised synchronously at the call that violates
/// the contract, before any mutation of the datastream collection.
/// Backend errors propagate unmodified from the collaborator; the core
/// performs no retry. Consistency anomalies (e.g. legacy
/// collection-member assertions observed alongside part assertions) are
/// logged as warnings, never raised through this type.
#[derive(Debug, Error)]
pub enum CofferError {
    // ===== Validation Errors =====
    /// Named datastream group is not declared on the object type
    #[error("Unknown datastream group: {group}")]
    UnknownGroup { group: String },

    /// Content-bearing group member was added without content
    #[error("Group {group} requires content and none was supplied")]
    ContentMissing { group: String },

    /// Content type could be neither inferred nor was supplied
    #[error("Content type for group {group} could not be determined")]
    ContentTypeMissing { group: String },

    /// Supplied content type conflicts with the group's mime constraint
    #[error("Group {group} requires content type {expected}, got {actual}")]
    ContentTypeMismatch {
        group: String,
        expected: String,
        actual: String,
    },

    /// Explicit datastream id does not conform to the group's id prefix
    #[error("Datastream id {dsid} does not match group prefix {prefix}")]
    DsidPrefixMismatch { dsid: String, prefix: String },

    /// Pid string failed to parse
    #[error(transparent)]
    InvalidPid(#[from] PidParseError),

    // ===== Lookup Errors =====
    /// Object not found in the object store or the index
    #[error("Object not found: {pid}")]
    ObjectNotFound { pid: String },

    /// Datastream not found on a persisted object
    #[error("Datastream not found: {pid}/{dsid}")]
    DatastreamNotFound { pid: String, dsid: String },

    /// Index document's id disagrees with the requested pid
    #[error("Index document id {found} does not match requested pid {requested}")]
    IdentifierMismatch { requested: String, found: String },

    // ===== Input Errors =====
    /// Caller-supplied input (seed file, document) failed validation
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Filesystem failure while reading caller-supplied input
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    // ===== Content Errors =====
    /// Relationship datastream content failed to parse
    #[error("Malformed relationship content: {reason}")]
    MalformedRelationships { reason: String },

    /// Structured content failed to serialize or deserialize
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // ===== Collaborator Errors =====
    /// Backend transport failure, propagated unmodified
    #[error(transparent)]
    Backend(#[from] BackendError),
}
