//! Object handles
//!
//! An [`ObjectHandle`] exclusively owns one digital object's working
//! state: the object attributes, the datastream collection, and the
//! metadata-dirty flag driving index publication. Backend access goes
//! through the shared session backends.
//!
//! The datastream view is lazy for persisted objects: the first access
//! with an empty in-memory collection loads and caches the backend's
//! manifest. Once the in-memory view is non-empty it supersedes the
//! backend view entirely; `refresh`/post-save reconciliation unions
//! backend-only entries back in.

use std::sync::Arc;

use coffer_core::backend::{ObjectStore, SearchIndex};
use coffer_core::collection::{AddOptions, DatastreamCollection, GroupAddOptions};
use coffer_core::errors::{CofferError, Result};
use coffer_core::model::{Datastream, DigitalObject, Predicate, RelTarget};
use coffer_core::registry::ObjectType;
use coffer_core::relations;
use coffer_core_types::schema::RELS_EXT_ID;
use coffer_core_types::Pid;

use crate::config::EngineConfig;
use crate::hook::ProjectionHook;

/// Working copy of one digital object bound to a session's backends
pub struct ObjectHandle {
    pub(crate) object: DigitalObject,
    pub(crate) object_type: Arc<ObjectType>,
    pub(crate) collection: DatastreamCollection,
    pub(crate) metadata_dirty: bool,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) index: Arc<dyn SearchIndex>,
    pub(crate) config: EngineConfig,
    pub(crate) hook: Option<Arc<dyn ProjectionHook>>,
}

impl ObjectHandle {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        object: DigitalObject,
        object_type: Arc<ObjectType>,
        collection: DatastreamCollection,
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn SearchIndex>,
        config: EngineConfig,
        hook: Option<Arc<dyn ProjectionHook>>,
    ) -> Self {
        Self {
            object,
            object_type,
            collection,
            metadata_dirty: false,
            store,
            index,
            config,
            hook,
        }
    }

    pub fn pid(&self) -> &Pid {
        self.object.pid()
    }

    pub fn uri(&self) -> String {
        self.object.uri()
    }

    pub fn is_new(&self) -> bool {
        self.object.is_new()
    }

    pub fn object(&self) -> &DigitalObject {
        &self.object
    }

    /// Mutable object attributes (label, state, owner)
    pub fn object_mut(&mut self) -> &mut DigitalObject {
        &mut self.object
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.object_type
    }

    /// Load the backend manifest into an empty collection of a
    /// persisted object. In-memory state, once present, supersedes the
    /// backend view.
    pub(crate) fn ensure_loaded(&mut self) -> Result<()> {
        if !self.object.is_new() && self.collection.is_empty() {
            let manifest = self.store.fetch_datastream_manifest(self.object.pid())?;
            self.collection.absorb_manifest(&manifest);
            tracing::debug!(
                pid = %self.object.pid(),
                streams = manifest.len(),
                "lazily loaded datastream manifest"
            );
        }
        Ok(())
    }

    /// The current datastream view
    pub fn datastreams(&mut self) -> Result<&DatastreamCollection> {
        self.ensure_loaded()?;
        Ok(&self.collection)
    }

    /// One datastream by id
    ///
    /// # Errors
    /// * `DatastreamNotFound` - the id is absent from the current view
    pub fn datastream(&mut self, dsid: &str) -> Result<&Datastream> {
        self.ensure_loaded()?;
        self.collection
            .get(dsid)
            .ok_or_else(|| self.not_found(dsid))
    }

    /// Mutable access to one datastream
    pub fn datastream_mut(&mut self, dsid: &str) -> Result<&mut Datastream> {
        self.ensure_loaded()?;
        let err = self.not_found(dsid);
        self.collection.get_mut(dsid).ok_or(err)
    }

    fn not_found(&self, dsid: &str) -> CofferError {
        CofferError::DatastreamNotFound {
            pid: self.object.pid().to_string(),
            dsid: dsid.to_string(),
        }
    }

    /// A datastream's raw content, fetching and caching it from the
    /// object store when it has not been loaded yet.
    pub fn datastream_content(&mut self, dsid: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_loaded()?;
        let persisted = !self.object.is_new();
        let pid = self.object.pid().clone();
        let ds = self
            .collection
            .get_mut(dsid)
            .ok_or_else(|| CofferError::DatastreamNotFound {
                pid: pid.to_string(),
                dsid: dsid.to_string(),
            })?;

        if ds.content.is_none() && persisted && !ds.new_record {
            ds.content = self.store.fetch_datastream_content(&pid, dsid)?;
        }
        Ok(ds.content.clone())
    }

    /// Add a datastream, minting an id over the current view when the
    /// datastream carries none
    pub fn add_datastream(&mut self, ds: Datastream, options: AddOptions) -> Result<String> {
        self.ensure_loaded()?;
        self.collection.add(ds, options)
    }

    /// Append a member to a declared named group
    pub fn add_group_member(&mut self, group: &str, options: GroupAddOptions) -> Result<String> {
        self.ensure_loaded()?;
        let object_type = Arc::clone(&self.object_type);
        self.collection
            .add_group_member(&object_type, group, options)
    }

    /// Members of a declared named group, insertion order
    pub fn group_members(&mut self, group: &str) -> Result<Vec<&Datastream>> {
        self.ensure_loaded()?;
        let prefix = self
            .object_type
            .group(group)
            .ok_or_else(|| CofferError::UnknownGroup {
                group: group.to_string(),
            })?
            .prefix
            .clone();
        Ok(self.collection.members_by_prefix(&prefix))
    }

    /// Member ids of a declared named group, insertion order
    pub fn group_member_ids(&mut self, group: &str) -> Result<Vec<String>> {
        Ok(self
            .group_members(group)?
            .iter()
            .map(|ds| ds.dsid.clone())
            .collect())
    }

    /// Make sure the relationship datastream's persisted content is in
    /// memory before the graph is parsed or rewritten.
    pub(crate) fn ensure_relationships_loaded(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        let unfetched = !self.object.is_new()
            && self
                .collection
                .get(RELS_EXT_ID)
                .map(|ds| ds.content.is_none() && !ds.new_record)
                .unwrap_or(false);
        if unfetched {
            self.datastream_content(RELS_EXT_ID)?;
        }
        Ok(())
    }

    /// Assert an outbound relationship; no-op on an identical existing
    /// triple
    pub fn add_relationship(&mut self, predicate: Predicate, target: RelTarget) -> Result<bool> {
        self.ensure_relationships_loaded()?;
        let subject = self.object.pid().clone();
        relations::add(&mut self.collection, &subject, predicate, target)
    }

    /// Remove an outbound relationship, honoring the configured
    /// missing-triple policy
    pub fn remove_relationship(
        &mut self,
        predicate: &Predicate,
        target: &RelTarget,
    ) -> Result<bool> {
        self.ensure_relationships_loaded()?;
        relations::remove(
            &mut self.collection,
            predicate,
            target,
            self.config.remove_missing_policy,
        )
    }

    /// Outbound `hasCollectionMember` targets
    pub fn collection_members(&mut self) -> Result<Vec<RelTarget>> {
        self.ensure_relationships_loaded()?;
        relations::collection_members(&self.collection)
    }

    /// Outbound `isPartOf` targets (what this object is part of)
    pub fn part_of(&mut self) -> Result<Vec<RelTarget>> {
        self.ensure_relationships_loaded()?;
        relations::part_of(&self.collection)
    }

    /// Outbound `hasPart` targets
    pub fn parts_outbound(&mut self) -> Result<Vec<RelTarget>> {
        self.ensure_relationships_loaded()?;
        relations::parts_outbound(&self.collection)
    }
}
