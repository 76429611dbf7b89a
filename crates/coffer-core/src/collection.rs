//! Datastream collection
//!
//! The single source of truth for "what datastreams does this object
//! have right now". The collection is insertion-ordered: prefix queries
//! and the save cycle walk datastreams in the order they were added,
//! not in numeric id order.
//!
//! Reconciliation rule (reproduced faithfully from the observed
//! design): once the in-memory view is non-empty it fully supersedes
//! the backend's view; the two are never merged on read. After a
//! successful write, [`DatastreamCollection::union_manifest`] unions
//! backend-only keys into the in-memory map so newly-discovered
//! backend datastreams become visible without clobbering pending
//! in-memory edits. The lazy first load from the backend manifest is
//! driven by the engine layer, which calls
//! [`DatastreamCollection::absorb_manifest`] when the collection is
//! empty and the object is persisted.

use std::collections::HashMap;

use crate::backend::DatastreamProfile;
use crate::dsid;
use crate::errors::{CofferError, Result};
use crate::model::{Datastream, DatastreamKind};
use crate::registry::ObjectType;
use coffer_core_types::schema::{DEFAULT_DSID_PREFIX, RELS_EXT_ID};

/// Options for [`DatastreamCollection::add`]
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Prefix for a minted id when the datastream carries none
    /// (defaults to `DS`)
    pub prefix: Option<String>,
}

/// Options for [`DatastreamCollection::add_group_member`]
#[derive(Debug, Clone, Default)]
pub struct GroupAddOptions {
    /// Explicit datastream id; must conform to the group prefix
    pub dsid: Option<String>,
    /// Raw content bytes
    pub content: Option<Vec<u8>>,
    /// Explicit content type
    pub content_type: Option<String>,
    /// Explicit label; defaults to the original filename
    pub label: Option<String>,
    /// Original filename of the supplied content
    pub filename: Option<String>,
}

/// Insertion-ordered map of dsid to datastream
#[derive(Debug, Clone, Default)]
pub struct DatastreamCollection {
    streams: HashMap<String, Datastream>,
    order: Vec<String>,
}

impl DatastreamCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, dsid: &str) -> bool {
        self.streams.contains_key(dsid)
    }

    pub fn get(&self, dsid: &str) -> Option<&Datastream> {
        self.streams.get(dsid)
    }

    pub fn get_mut(&mut self, dsid: &str) -> Option<&mut Datastream> {
        self.streams.get_mut(dsid)
    }

    /// Datastream ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Datastreams in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Datastream> {
        self.order.iter().filter_map(|id| self.streams.get(id))
    }

    /// Insert under the datastream's own id; a replaced entry keeps its
    /// original position in the order.
    pub fn insert(&mut self, ds: Datastream) {
        if !self.streams.contains_key(&ds.dsid) {
            self.order.push(ds.dsid.clone());
        }
        self.streams.insert(ds.dsid.clone(), ds);
    }

    /// Add a datastream, minting an id if it carries none
    ///
    /// Returns the id the datastream is stored under.
    pub fn add(&mut self, mut ds: Datastream, options: AddOptions) -> Result<String> {
        if ds.dsid.is_empty() {
            let prefix = options.prefix.as_deref().unwrap_or(DEFAULT_DSID_PREFIX);
            ds.dsid = self.generate_dsid(prefix);
        }
        let dsid = ds.dsid.clone();
        self.insert(ds);
        Ok(dsid)
    }

    /// Append a member to a declared named group
    ///
    /// All validation happens before any mutation; a failed call leaves
    /// the collection unchanged.
    ///
    /// # Errors
    /// * `UnknownGroup` - the group is not declared on the type
    /// * `ContentMissing` - content-bearing group without content
    /// * `ContentTypeMissing` - no content type supplied or inferable
    /// * `ContentTypeMismatch` - supplied type conflicts with the
    ///   group's mime constraint
    /// * `DsidPrefixMismatch` - explicit id does not match `prefix[0-9]`
    pub fn add_group_member(
        &mut self,
        object_type: &ObjectType,
        group_name: &str,
        options: GroupAddOptions,
    ) -> Result<String> {
        let group = object_type
            .group(group_name)
            .ok_or_else(|| CofferError::UnknownGroup {
                group: group_name.to_string(),
            })?;

        if group.kind == DatastreamKind::Content && options.content.is_none() {
            return Err(CofferError::ContentMissing {
                group: group_name.to_string(),
            });
        }

        let content_type = options
            .content_type
            .clone()
            .or_else(|| options.filename.as_deref().and_then(infer_content_type))
            .or_else(|| group.mime_type.clone());
        let content_type = match content_type {
            Some(ct) => ct,
            None if group.kind == DatastreamKind::Content => {
                return Err(CofferError::ContentTypeMissing {
                    group: group_name.to_string(),
                })
            }
            // Structured kinds always serialize as JSON
            None => "application/json".to_string(),
        };

        if let Some(required) = &group.mime_type {
            if required != &content_type {
                return Err(CofferError::ContentTypeMismatch {
                    group: group_name.to_string(),
                    expected: required.clone(),
                    actual: content_type,
                });
            }
        }

        if let Some(dsid) = options.dsid.as_deref().filter(|d| !d.is_empty()) {
            let suffix_ok = dsid
                .strip_prefix(group.prefix.as_str())
                .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false);
            if !suffix_ok {
                return Err(CofferError::DsidPrefixMismatch {
                    dsid: dsid.to_string(),
                    prefix: group.prefix.clone(),
                });
            }
        }

        let mut ds = Datastream::new(options.dsid.unwrap_or_default(), group.kind);
        ds.label = options
            .label
            .or(options.filename)
            .unwrap_or_default();
        ds.mime_type = Some(content_type);
        if let Some(bytes) = options.content {
            ds.set_content(bytes);
        }

        self.add(
            ds,
            AddOptions {
                prefix: Some(group.prefix.clone()),
            },
        )
    }

    /// Ids matching `prefix` followed only by digits, insertion order
    pub fn ids_by_prefix(&self, prefix: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| dsid::matches_prefix(id, prefix))
            .cloned()
            .collect()
    }

    /// Datastreams matching a prefix, insertion order
    pub fn members_by_prefix(&self, prefix: &str) -> Vec<&Datastream> {
        self.order
            .iter()
            .filter(|id| dsid::matches_prefix(id, prefix))
            .filter_map(|id| self.streams.get(id))
            .collect()
    }

    /// Next free id for a prefix over the current keys
    pub fn generate_dsid(&self, prefix: &str) -> String {
        dsid::next_dsid(self.order.iter().map(String::as_str), prefix)
    }

    /// Structured-metadata datastreams, insertion order
    pub fn metadata_streams(&self) -> Vec<&Datastream> {
        self.iter().filter(|ds| ds.is_metadata()).collect()
    }

    /// Content-bearing datastreams excluding the reserved structural
    /// ids (`DC`, `RELS-EXT`), insertion order
    pub fn file_streams(&self) -> Vec<&Datastream> {
        self.iter()
            .filter(|ds| !ds.is_metadata() && !ds.is_reserved())
            .collect()
    }

    /// Ids of datastreams needing a write (dirty or new), insertion
    /// order
    pub fn dirty_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|ds| ds.dirty || ds.new_record)
            .map(|ds| ds.dsid.clone())
            .collect()
    }

    /// Load the backend's view into an empty in-memory map
    ///
    /// Entries are constructed relationship-bearing iff the id is
    /// `RELS-EXT`, generic content-bearing otherwise, and marked
    /// not-new and clean. Content is left unfetched.
    pub fn absorb_manifest(&mut self, entries: &[DatastreamProfile]) {
        for entry in entries {
            self.insert(manifest_datastream(entry));
        }
    }

    /// Union backend-only keys into the in-memory map
    ///
    /// Backend entries win only for keys not already present; pending
    /// in-memory edits are never clobbered.
    pub fn union_manifest(&mut self, entries: &[DatastreamProfile]) {
        for entry in entries {
            if !self.contains(&entry.dsid) {
                self.insert(manifest_datastream(entry));
            }
        }
    }
}

fn manifest_datastream(entry: &DatastreamProfile) -> Datastream {
    let kind = if entry.dsid == RELS_EXT_ID {
        DatastreamKind::Relations
    } else {
        DatastreamKind::Content
    };
    let mut ds = Datastream::new(entry.dsid.clone(), kind);
    ds.label = entry.label.clone();
    if entry.mime_type.is_some() {
        ds.mime_type = entry.mime_type.clone();
    }
    ds.control_group = entry.control_group.clone();
    ds.dirty = false;
    ds.new_record = false;
    ds
}

/// Guess a content type from a filename extension
fn infer_content_type(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext)?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "xml" => "text/xml",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GroupSpec;

    fn image_type() -> std::sync::Arc<ObjectType> {
        ObjectType::builder("Item")
            .named_group("image", GroupSpec::default().mime_type("image/png"))
            .named_group("note", GroupSpec::default().kind(DatastreamKind::Metadata))
            .build()
    }

    #[test]
    fn test_add_mints_sequential_ids() {
        let mut collection = DatastreamCollection::new();
        let a = collection
            .add(Datastream::new("", DatastreamKind::Content), AddOptions::default())
            .unwrap();
        let b = collection
            .add(Datastream::new("", DatastreamKind::Content), AddOptions::default())
            .unwrap();
        assert_eq!(a, "DS1");
        assert_eq!(b, "DS2");
    }

    #[test]
    fn test_add_keeps_explicit_id() {
        let mut collection = DatastreamCollection::new();
        let id = collection
            .add(
                Datastream::new("TN", DatastreamKind::Content),
                AddOptions::default(),
            )
            .unwrap();
        assert_eq!(id, "TN");
    }

    #[test]
    fn test_group_member_happy_path() {
        let ty = image_type();
        let mut collection = DatastreamCollection::new();
        let id = collection
            .add_group_member(
                &ty,
                "image",
                GroupAddOptions {
                    content: Some(vec![1, 2, 3]),
                    content_type: Some("image/png".to_string()),
                    filename: Some("scan.png".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(id, "IMAGE1");

        let ds = collection.get("IMAGE1").unwrap();
        assert_eq!(ds.label, "scan.png");
        assert_eq!(ds.mime_type.as_deref(), Some("image/png"));
        assert!(ds.dirty);
    }

    #[test]
    fn test_group_member_unknown_group() {
        let ty = image_type();
        let mut collection = DatastreamCollection::new();
        let result = collection.add_group_member(&ty, "audio", GroupAddOptions::default());
        assert!(matches!(result, Err(CofferError::UnknownGroup { .. })));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_group_member_requires_content() {
        let ty = image_type();
        let mut collection = DatastreamCollection::new();
        let result = collection.add_group_member(&ty, "image", GroupAddOptions::default());
        assert!(matches!(result, Err(CofferError::ContentMissing { .. })));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_group_member_content_type_mismatch_leaves_collection_unchanged() {
        let ty = image_type();
        let mut collection = DatastreamCollection::new();
        let result = collection.add_group_member(
            &ty,
            "image",
            GroupAddOptions {
                content: Some(vec![0]),
                content_type: Some("text/plain".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(CofferError::ContentTypeMismatch { .. })
        ));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_group_member_content_type_inferred_from_filename() {
        let ty = ObjectType::builder("Item")
            .named_group("file", GroupSpec::default())
            .build();
        let mut collection = DatastreamCollection::new();
        let id = collection
            .add_group_member(
                &ty,
                "file",
                GroupAddOptions {
                    content: Some(vec![0]),
                    filename: Some("report.pdf".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(
            collection.get(&id).unwrap().mime_type.as_deref(),
            Some("application/pdf")
        );
    }

    #[test]
    fn test_group_member_content_type_missing() {
        let ty = ObjectType::builder("Item")
            .named_group("file", GroupSpec::default())
            .build();
        let mut collection = DatastreamCollection::new();
        let result = collection.add_group_member(
            &ty,
            "file",
            GroupAddOptions {
                content: Some(vec![0]),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CofferError::ContentTypeMissing { .. })));
    }

    #[test]
    fn test_group_member_rejects_nonconforming_explicit_id() {
        let ty = image_type();
        let mut collection = DatastreamCollection::new();
        let result = collection.add_group_member(
            &ty,
            "image",
            GroupAddOptions {
                dsid: Some("THUMB1".to_string()),
                content: Some(vec![0]),
                content_type: Some("image/png".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CofferError::DsidPrefixMismatch { .. })));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_prefix_queries_preserve_insertion_order() {
        let mut collection = DatastreamCollection::new();
        for id in ["IMAGE2", "IMAGE10", "IMAGE1", "OTHER"] {
            collection.insert(Datastream::new(id, DatastreamKind::Content));
        }
        assert_eq!(
            collection.ids_by_prefix("IMAGE"),
            vec!["IMAGE2", "IMAGE10", "IMAGE1"]
        );
    }

    #[test]
    fn test_file_streams_exclude_reserved() {
        let mut collection = DatastreamCollection::new();
        collection.insert(Datastream::new("DC", DatastreamKind::Metadata));
        collection.insert(Datastream::new("RELS-EXT", DatastreamKind::Relations));
        collection.insert(Datastream::new("DS1", DatastreamKind::Content));

        let files = collection.file_streams();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].dsid, "DS1");

        let metadata = collection.metadata_streams();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].dsid, "DC");
    }

    #[test]
    fn test_absorb_manifest_marks_clean_and_tags_rels_ext() {
        let mut collection = DatastreamCollection::new();
        collection.absorb_manifest(&[
            DatastreamProfile {
                dsid: "RELS-EXT".to_string(),
                label: "relationships".to_string(),
                mime_type: Some("application/json".to_string()),
                control_group: "X".to_string(),
                size: None,
                checksum: None,
            },
            DatastreamProfile {
                dsid: "IMAGE1".to_string(),
                label: "scan".to_string(),
                mime_type: Some("image/png".to_string()),
                control_group: "M".to_string(),
                size: Some(3),
                checksum: None,
            },
        ]);

        let rels = collection.get("RELS-EXT").unwrap();
        assert_eq!(rels.kind, DatastreamKind::Relations);
        assert!(!rels.dirty);
        assert!(!rels.new_record);
        assert_eq!(collection.get("IMAGE1").unwrap().kind, DatastreamKind::Content);
    }

    #[test]
    fn test_union_never_clobbers_memory() {
        let mut collection = DatastreamCollection::new();
        let mut edited = Datastream::new("IMAGE1", DatastreamKind::Content);
        edited.set_content(b"pending edit".to_vec());
        collection.insert(edited);

        collection.union_manifest(&[
            DatastreamProfile {
                dsid: "IMAGE1".to_string(),
                label: "backend copy".to_string(),
                mime_type: None,
                control_group: "M".to_string(),
                size: None,
                checksum: None,
            },
            DatastreamProfile {
                dsid: "TN".to_string(),
                label: "thumbnail".to_string(),
                mime_type: Some("image/jpeg".to_string()),
                control_group: "M".to_string(),
                size: None,
                checksum: None,
            },
        ]);

        // Pending edit survives; backend-only key appears.
        assert_eq!(
            collection.get("IMAGE1").unwrap().content.as_deref(),
            Some(b"pending edit".as_ref())
        );
        assert!(collection.contains("TN"));
        assert!(!collection.get("TN").unwrap().dirty);
    }
}
