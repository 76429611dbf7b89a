//! Sessions: backend wiring and handle construction

use std::path::Path;
use std::sync::Arc;

use coffer_core::backend::{IndexDocument, ObjectStore, SearchIndex};
use coffer_core::collection::DatastreamCollection;
use coffer_core::errors::{CofferError, Result};
use coffer_core::model::{DatastreamKind, DigitalObject};
use coffer_core::registry::ObjectType;
use coffer_core_types::Pid;

use crate::config::EngineConfig;
use crate::handle::ObjectHandle;
use crate::hook::ProjectionHook;
use crate::indexer;

/// A session binds the two backends and the engine configuration
///
/// Handles constructed through a session share the backends by
/// reference; each handle exclusively owns one object's working state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn SearchIndex>,
    config: EngineConfig,
    hook: Option<Arc<dyn ProjectionHook>>,
}

impl Session {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn SearchIndex>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            index,
            config,
            hook: None,
        }
    }

    /// Install an external projection hook
    pub fn with_projection_hook(mut self, hook: Arc<dyn ProjectionHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a new object under a freshly minted pid
    ///
    /// Static datastream specs are materialized with their initializer
    /// defaults; nothing is persisted until the first `save`.
    pub fn create(&self, object_type: &Arc<ObjectType>) -> Result<ObjectHandle> {
        let pid = self.store.mint_pid()?;
        self.create_with_pid(object_type, pid)
    }

    /// Create a new object under a caller-supplied pid
    pub fn create_with_pid(
        &self,
        object_type: &Arc<ObjectType>,
        pid: Pid,
    ) -> Result<ObjectHandle> {
        tracing::debug!(pid = %pid, model = object_type.name(), "creating object");
        let object = DigitalObject::new(pid);
        let mut collection = DatastreamCollection::new();
        for ds in object_type.materialize_statics() {
            collection.insert(ds);
        }
        Ok(self.handle(object, object_type, collection))
    }

    /// Load a persisted object from the object store
    ///
    /// Statics are materialized with initializer defaults, then
    /// persisted attributes are merged over them (persisted values win
    /// on key collision).
    ///
    /// # Errors
    /// * `ObjectNotFound` - no object under the pid
    pub fn load(&self, object_type: &Arc<ObjectType>, pid: &Pid) -> Result<ObjectHandle> {
        let profile = self
            .store
            .fetch_object(pid)?
            .ok_or_else(|| CofferError::ObjectNotFound {
                pid: pid.to_string(),
            })?;

        let mut object = DigitalObject::new(profile.pid.clone());
        object.new_record = false;
        object.label = profile.label;
        object.state = profile.state;
        object.owner_id = profile.owner_id;
        object.create_date = profile.create_date;
        object.modified_date = profile.modified_date;

        let mut collection = DatastreamCollection::new();
        for mut ds in object_type.materialize_statics() {
            match self.store.fetch_datastream_content(pid, &ds.dsid)? {
                Some(content) => {
                    match ds.kind {
                        DatastreamKind::Metadata => ds.merge_persisted_fields(&content)?,
                        _ => ds.content = Some(content),
                    }
                    ds.mark_persisted();
                }
                // Declared but never persisted: stays new, written on
                // the next save.
                None => {}
            }
            collection.insert(ds);
        }

        tracing::debug!(pid = %pid, streams = collection.len(), "loaded object");
        Ok(self.handle(object, object_type, collection))
    }

    /// Reconstruct an object from its search-index document
    ///
    /// A faster, possibly-stale alternative to [`Session::load`]: the
    /// handle is stamped with the index's cached dates, the
    /// relationship graph is materialized eagerly, and metadata
    /// statics populate themselves from the document's fields.
    ///
    /// # Errors
    /// * `ObjectNotFound` - neither a supplied document nor an index
    ///   hit exists
    /// * `IdentifierMismatch` - the document's id disagrees with the
    ///   requested pid
    pub fn load_from_index(
        &self,
        object_type: &Arc<ObjectType>,
        pid: &Pid,
        document: Option<IndexDocument>,
    ) -> Result<ObjectHandle> {
        let document = match document {
            Some(doc) => doc,
            None => self
                .index
                .query(pid)?
                .ok_or_else(|| CofferError::ObjectNotFound {
                    pid: pid.to_string(),
                })?,
        };

        let (object, collection) = indexer::reconstruct(object_type, pid, &document)?;
        Ok(self.handle(object, object_type, collection))
    }

    fn handle(
        &self,
        object: DigitalObject,
        object_type: &Arc<ObjectType>,
        collection: DatastreamCollection,
    ) -> ObjectHandle {
        ObjectHandle::new(
            object,
            Arc::clone(object_type),
            collection,
            Arc::clone(&self.store),
            Arc::clone(&self.index),
            self.config.clone(),
            self.hook.clone(),
        )
    }
}

/// Open a SQLite-backed session
pub fn open_sqlite_session(
    path: &Path,
    namespace: &str,
    config: EngineConfig,
) -> Result<Session> {
    let (store, index) = coffer_store::open_sqlite(path, namespace)?;
    Ok(Session::new(Arc::new(store), Arc::new(index), config))
}
