//! In-memory backend pair
//!
//! `HashMap`-based implementations of the object store and search
//! index contracts. All state sits behind a mutex so the traits'
//! `&self` methods work without external locking; suitable for tests
//! and in-process embedding, not durability.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;

use coffer_core::backend::{
    BackendError, BackendResult, DatastreamProfile, IndexDocument, ObjectProfile, ObjectStore,
    RelationshipAssertion, SearchIndex,
};
use coffer_core::model::{DigitalObject, Predicate};
use coffer_core_types::schema::predicate_from_rel_field;
use coffer_core_types::Pid;

#[derive(Debug, Clone)]
struct StoredDatastream {
    profile: DatastreamProfile,
    content: Vec<u8>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    profile: ObjectProfile,
    datastreams: BTreeMap<String, StoredDatastream>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    objects: BTreeMap<String, StoredObject>,
    pid_counter: u64,
}

/// In-memory object store with a sequential pid mint
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    /// Create an empty store minting pids under the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            inner: Mutex::new(MemoryStoreInner::default()),
        }
    }

    /// Number of objects currently held
    pub fn object_count(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("coffer")
    }
}

impl ObjectStore for MemoryStore {
    fn mint_pid(&self) -> BackendResult<Pid> {
        let mut inner = self.inner.lock().unwrap();
        inner.pid_counter += 1;
        let raw = format!("{}:{}", self.namespace, inner.pid_counter);
        Pid::parse(&raw).map_err(|err| BackendError::Message(err.to_string()))
    }

    fn fetch_object(&self, pid: &Pid) -> BackendResult<Option<ObjectProfile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.objects.get(pid.as_str()).map(|o| o.profile.clone()))
    }

    fn fetch_datastream_manifest(&self, pid: &Pid) -> BackendResult<Vec<DatastreamProfile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .objects
            .get(pid.as_str())
            .map(|o| o.datastreams.values().map(|ds| ds.profile.clone()).collect())
            .unwrap_or_default())
    }

    fn fetch_datastream_content(&self, pid: &Pid, dsid: &str) -> BackendResult<Option<Vec<u8>>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .objects
            .get(pid.as_str())
            .and_then(|o| o.datastreams.get(dsid))
            .map(|ds| ds.content.clone()))
    }

    fn save_object(&self, object: &DigitalObject) -> BackendResult<ObjectProfile> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let existing_create = inner
            .objects
            .get(object.pid().as_str())
            .and_then(|o| o.profile.create_date);

        let profile = ObjectProfile {
            pid: object.pid().clone(),
            label: object.label.clone(),
            state: object.state,
            owner_id: object.owner_id.clone(),
            create_date: Some(existing_create.unwrap_or(now)),
            modified_date: Some(now),
        };

        inner
            .objects
            .entry(object.pid().as_str().to_string())
            .and_modify(|o| o.profile = profile.clone())
            .or_insert_with(|| StoredObject {
                profile: profile.clone(),
                datastreams: BTreeMap::new(),
            });

        Ok(profile)
    }

    fn save_datastream(
        &self,
        pid: &Pid,
        profile: &DatastreamProfile,
        content: &[u8],
    ) -> BackendResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let object = inner
            .objects
            .get_mut(pid.as_str())
            .ok_or_else(|| BackendError::NotFound(pid.to_string()))?;
        object.datastreams.insert(
            profile.dsid.clone(),
            StoredDatastream {
                profile: profile.clone(),
                content: content.to_vec(),
            },
        );
        Ok(())
    }

    fn delete_object(&self, pid: &Pid) -> BackendResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.objects.remove(pid.as_str()).is_some())
    }
}

/// In-memory search index
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: Mutex<BTreeMap<String, IndexDocument>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held
    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

impl SearchIndex for MemoryIndex {
    fn query(&self, pid: &Pid) -> BackendResult<Option<IndexDocument>> {
        let documents = self.documents.lock().unwrap();
        Ok(documents.get(pid.as_str()).cloned())
    }

    fn update(&self, document: &IndexDocument) -> BackendResult<()> {
        let id = document
            .id()
            .ok_or_else(|| BackendError::Message("index document without id".to_string()))?
            .to_string();
        let mut documents = self.documents.lock().unwrap();
        documents.insert(id, document.clone());
        Ok(())
    }

    fn delete(&self, pid: &Pid) -> BackendResult<bool> {
        let mut documents = self.documents.lock().unwrap();
        Ok(documents.remove(pid.as_str()).is_some())
    }

    fn query_relationships_to(
        &self,
        target_uri: &str,
    ) -> BackendResult<Vec<RelationshipAssertion>> {
        let documents = self.documents.lock().unwrap();
        let mut assertions = Vec::new();
        for doc in documents.values() {
            let Some(id) = doc.id() else { continue };
            let Ok(source) = Pid::parse(id) else { continue };
            for (field, values) in doc.relationship_fields() {
                if !values.iter().any(|v| v == target_uri) {
                    continue;
                }
                if let Some(predicate) = predicate_from_rel_field(field) {
                    assertions.push(RelationshipAssertion {
                        source: source.clone(),
                        predicate: Predicate::from(predicate),
                    });
                }
            }
        }
        Ok(assertions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_pid_sequence() {
        let store = MemoryStore::new("demo");
        assert_eq!(store.mint_pid().unwrap().as_str(), "demo:1");
        assert_eq!(store.mint_pid().unwrap().as_str(), "demo:2");
    }

    #[test]
    fn test_save_object_stamps_dates() {
        let store = MemoryStore::new("demo");
        let pid = store.mint_pid().unwrap();
        let object = DigitalObject::new(pid.clone());

        let first = store.save_object(&object).unwrap();
        assert!(first.create_date.is_some());
        assert!(first.modified_date.is_some());

        let second = store.save_object(&object).unwrap();
        assert_eq!(second.create_date, first.create_date);
        assert!(second.modified_date >= first.modified_date);
    }

    #[test]
    fn test_datastream_requires_saved_object() {
        let store = MemoryStore::new("demo");
        let pid = store.mint_pid().unwrap();
        let profile = DatastreamProfile {
            dsid: "DS1".to_string(),
            label: String::new(),
            mime_type: None,
            control_group: "M".to_string(),
            size: Some(1),
            checksum: None,
        };

        let result = store.save_datastream(&pid, &profile, b"x");
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_index_inbound_query() {
        let index = MemoryIndex::new();
        let mut doc = IndexDocument::new();
        doc.set("id", "demo:2");
        doc.append("rel_is_part_of", "info:fedora/demo:1");
        index.update(&doc).unwrap();

        let assertions = index.query_relationships_to("info:fedora/demo:1").unwrap();
        assert_eq!(assertions.len(), 1);
        assert_eq!(assertions[0].source.as_str(), "demo:2");
        assert_eq!(assertions[0].predicate, Predicate::IsPartOf);

        assert!(index
            .query_relationships_to("info:fedora/demo:9")
            .unwrap()
            .is_empty());
    }
}
