use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::Result;
use coffer_core_types::schema::{DC_ID, RELS_EXT_ID};

/// Closed set of datastream kinds
///
/// The collection and the index projector switch on this tag instead of
/// open-ended type inspection: plain content-bearing streams, structured
/// metadata streams, and the one relationship-bearing stream per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatastreamKind {
    /// Plain content-bearing (managed binary payload)
    #[default]
    Content,
    /// Structured metadata (named fields, serialized as JSON content)
    Metadata,
    /// Relationship-bearing (the reserved `RELS-EXT` singleton)
    Relations,
}

/// Datastream - a named sub-resource of a digital object
///
/// Owned by exactly one object; the dsid is unique within that object at
/// all times. `dirty`/`new_record` drive the persistence orchestrator:
/// only dirty-or-new datastreams are written during a save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datastream {
    /// Id, unique within the owning object (`PREFIX<integer>` for
    /// generated ids)
    pub dsid: String,

    /// Kind tag
    pub kind: DatastreamKind,

    /// Human-readable label
    pub label: String,

    /// Content mime type
    pub mime_type: Option<String>,

    /// Storage control group recorded by the object store ("M" managed,
    /// "X" inline)
    pub control_group: String,

    /// Raw content bytes; `None` means not yet fetched from the backend
    pub content: Option<Vec<u8>>,

    /// Structured fields (Metadata kind); field name to ordered values
    pub fields: BTreeMap<String, Vec<String>>,

    /// True when in-memory state diverges from the persisted state
    pub dirty: bool,

    /// True until the first successful save of this datastream
    pub new_record: bool,
}

impl Datastream {
    /// Create a new in-memory datastream of the given kind
    ///
    /// New datastreams start dirty so the next save cycle picks them up.
    pub fn new(dsid: impl Into<String>, kind: DatastreamKind) -> Self {
        let (control_group, mime_type) = match kind {
            DatastreamKind::Content => ("M", None),
            DatastreamKind::Metadata | DatastreamKind::Relations => {
                ("X", Some("application/json".to_string()))
            }
        };
        Self {
            dsid: dsid.into(),
            kind,
            label: String::new(),
            mime_type,
            control_group: control_group.to_string(),
            content: None,
            fields: BTreeMap::new(),
            dirty: true,
            new_record: true,
        }
    }

    pub fn is_metadata(&self) -> bool {
        self.kind == DatastreamKind::Metadata
    }

    pub fn is_relations(&self) -> bool {
        self.kind == DatastreamKind::Relations
    }

    /// Check whether this is one of the reserved structural datastreams
    /// (`DC`, `RELS-EXT`) excluded from file-stream queries.
    pub fn is_reserved(&self) -> bool {
        self.dsid == DC_ID || self.dsid == RELS_EXT_ID
    }

    /// Replace the raw content and mark the datastream dirty
    pub fn set_content(&mut self, bytes: Vec<u8>) {
        self.content = Some(bytes);
        self.dirty = true;
    }

    /// Replace a structured field's values and mark the datastream dirty
    pub fn set_field(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.fields.insert(name.into(), values);
        self.dirty = true;
    }

    /// Append one value to a structured field and mark the datastream dirty
    pub fn add_field_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
        self.dirty = true;
    }

    /// First value of a structured field, if present
    pub fn field_first(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// The byte representation written to the object store
    ///
    /// Metadata streams persist their structured fields as JSON; other
    /// kinds persist the raw content (empty if none was set).
    pub fn persistable_content(&self) -> Result<Vec<u8>> {
        match self.kind {
            DatastreamKind::Metadata => Ok(serde_json::to_vec(&self.fields)?),
            _ => Ok(self.content.clone().unwrap_or_default()),
        }
    }

    /// Load structured fields from persisted bytes, persisted values
    /// winning over any defaults already present on key collision.
    ///
    /// Does not touch the dirty flag: merged state reflects the backend.
    pub fn merge_persisted_fields(&mut self, bytes: &[u8]) -> Result<()> {
        let persisted: BTreeMap<String, Vec<String>> = serde_json::from_slice(bytes)?;
        for (name, values) in persisted {
            self.fields.insert(name, values);
        }
        Ok(())
    }

    /// SHA-256 digest of the persistable content, hex-encoded
    pub fn checksum(&self) -> Result<String> {
        let bytes = self.persistable_content()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Clear the dirty and new flags after a successful backend write
    pub fn mark_persisted(&mut self) {
        self.dirty = false;
        self.new_record = false;
    }

    /// Manifest-row view of this datastream, as handed to the object
    /// store on save
    pub fn to_profile(&self) -> Result<crate::backend::DatastreamProfile> {
        let content = self.persistable_content()?;
        Ok(crate::backend::DatastreamProfile {
            dsid: self.dsid.clone(),
            label: self.label.clone(),
            mime_type: self.mime_type.clone(),
            control_group: self.control_group.clone(),
            size: Some(content.len() as u64),
            checksum: Some(self.checksum()?),
        })
    }
}
