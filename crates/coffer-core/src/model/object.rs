use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coffer_core_types::Pid;

/// Lifecycle state of a digital object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObjectState {
    #[default]
    Active,
    Inactive,
    Deleted,
}

impl ObjectState {
    /// Single-letter state code used by the object store envelope
    pub fn code(&self) -> &'static str {
        match self {
            ObjectState::Active => "A",
            ObjectState::Inactive => "I",
            ObjectState::Deleted => "D",
        }
    }

    /// Parse a state code; unknown codes fall back to Active
    pub fn from_code(code: &str) -> Self {
        match code {
            "I" => ObjectState::Inactive,
            "D" => ObjectState::Deleted,
            _ => ObjectState::Active,
        }
    }
}

/// DigitalObject - the top-level persisted entity
///
/// Identified by an immutable pid, owned exclusively by one handle. The
/// `new_record` flag distinguishes the create and update phases of the
/// persistence protocol; `create_date`/`modified_date` are stamped only
/// by the backend and stay `None` while the object is new.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalObject {
    pid: Pid,

    /// True until the first successful save
    pub new_record: bool,

    /// Human-readable label
    pub label: String,

    /// Lifecycle state
    pub state: ObjectState,

    /// Owner principal recorded with the object
    pub owner_id: String,

    /// Backend-stamped creation timestamp
    pub create_date: Option<DateTime<Utc>>,

    /// Backend-stamped last-modification timestamp
    pub modified_date: Option<DateTime<Utc>>,
}

impl DigitalObject {
    /// Create a new, never-persisted object under a freshly minted pid
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            new_record: true,
            label: String::new(),
            state: ObjectState::Active,
            owner_id: String::new(),
            create_date: None,
            modified_date: None,
        }
    }

    /// The object's immutable identifier
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// URI form of the identifier, used as a relationship subject/target
    pub fn uri(&self) -> String {
        self.pid.uri()
    }

    /// Check whether the object has never been persisted
    pub fn is_new(&self) -> bool {
        self.new_record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> Pid {
        Pid::parse(s).unwrap()
    }

    #[test]
    fn test_new_object_defaults() {
        let object = DigitalObject::new(pid("demo:1"));
        assert!(object.is_new());
        assert_eq!(object.state, ObjectState::Active);
        assert!(object.create_date.is_none());
        assert!(object.modified_date.is_none());
        assert_eq!(object.uri(), "info:fedora/demo:1");
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(ObjectState::Active.code(), "A");
        assert_eq!(ObjectState::from_code("D"), ObjectState::Deleted);
        assert_eq!(ObjectState::from_code("?"), ObjectState::Active);
    }
}
