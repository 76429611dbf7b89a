//! Save, delete, and refresh cycles
//!
//! The save cycle is a two-state machine: create (the object has never
//! been persisted) asserts the model relationship and forces the
//! metadata-dirty flag before running the shared update path; update
//! runs it directly. The update path writes the object's attributes
//! first, then each dirty-or-new datastream individually in insertion
//! order. There is no cross-datastream transaction: datastreams
//! written before a failure stay written and clean, so re-invoking
//! `save` resumes with the remaining dirty ones.

use std::sync::Arc;

use coffer_core::backend::{ObjectProfile, RelationshipAssertion};
use coffer_core::errors::{CofferError, Result};
use coffer_core::model::{Predicate, RelTarget};
use coffer_core::registry::ObjectType;

use crate::handle::ObjectHandle;
use crate::session::Session;

impl ObjectHandle {
    /// Persist the object and every dirty datastream
    ///
    /// Returns the object write receipt (the backend's signal for the
    /// attribute write, not an aggregate of per-datastream results).
    /// After persistence the new-object flag is cleared; if any
    /// metadata- or relationship-bearing datastream was written and
    /// index updates are enabled, the index document is projected and
    /// published before the metadata-dirty flag clears.
    pub fn save(&mut self) -> Result<ObjectProfile> {
        if self.object.is_new() {
            let model = RelTarget::Uri(self.object_type.model_uri());
            self.add_relationship(Predicate::HasModel, model)?;
            self.metadata_dirty = true;
        }
        self.update()
    }

    fn update(&mut self) -> Result<ObjectProfile> {
        let pid = self.object.pid().clone();
        tracing::debug!(pid = %pid, "persisting object attributes");
        let receipt = self.store.save_object(&self.object)?;
        self.object.create_date = receipt.create_date;
        self.object.modified_date = receipt.modified_date;

        for dsid in self.collection.dirty_ids() {
            let ds = self
                .collection
                .get_mut(&dsid)
                .expect("dirty id came from the collection");
            let profile = ds.to_profile()?;
            let content = ds.persistable_content()?;
            self.store.save_datastream(&pid, &profile, &content)?;
            ds.mark_persisted();
            if ds.is_metadata() || ds.is_relations() {
                self.metadata_dirty = true;
            }
            tracing::debug!(pid = %pid, dsid = %dsid, "persisted datastream");
        }

        // Absorb backend-only datastreams without clobbering the
        // in-memory view.
        let manifest = self.store.fetch_datastream_manifest(&pid)?;
        self.collection.union_manifest(&manifest);

        self.object.new_record = false;

        if self.metadata_dirty && self.config.index_updates_enabled {
            self.publish_index()?;
        }
        self.metadata_dirty = false;

        Ok(receipt)
    }

    /// Delete the object from both backends
    ///
    /// Inbound references are cleaned up first: each referrer is
    /// loaded, loses its assertion, and is re-saved. Cleanup is
    /// best-effort per referrer - a failure is logged and the
    /// remaining referrers are still attempted - and happens before
    /// the object leaves the store, so other objects never retain
    /// dangling assertions undetected. Returns whether the object
    /// store held the object.
    pub fn delete(mut self) -> Result<bool> {
        let pid = self.object.pid().clone();
        let uri = self.object.uri();

        for assertion in self.index.query_relationships_to(&uri)? {
            if let Err(err) = self.remove_inbound_reference(&assertion, &uri) {
                tracing::warn!(
                    pid = %pid,
                    referrer = %assertion.source,
                    error = %err,
                    "inbound reference cleanup failed, continuing"
                );
            }
        }

        let removed = self.store.delete_object(&pid)?;
        if self.config.index_updates_enabled {
            self.index.delete(&pid)?;
        }
        tracing::info!(pid = %pid, "deleted object");
        Ok(removed)
    }

    fn remove_inbound_reference(
        &mut self,
        assertion: &RelationshipAssertion,
        target_uri: &str,
    ) -> Result<()> {
        let session = Session::new(
            Arc::clone(&self.store),
            Arc::clone(&self.index),
            self.config.clone(),
        );
        let mut referrer = session.load(&ObjectType::generic(), &assertion.source)?;
        referrer.remove_relationship(
            &assertion.predicate,
            &RelTarget::from_uri_string(target_uri),
        )?;
        referrer.save()?;
        Ok(())
    }

    /// Reload object attributes from the backend and union
    /// backend-discovered datastreams into the in-memory collection
    /// (backend entries win only for keys not already present).
    pub fn refresh(&mut self) -> Result<()> {
        let pid = self.object.pid().clone();
        let profile = self
            .store
            .fetch_object(&pid)?
            .ok_or_else(|| CofferError::ObjectNotFound {
                pid: pid.to_string(),
            })?;

        self.object.label = profile.label;
        self.object.state = profile.state;
        self.object.owner_id = profile.owner_id;
        self.object.create_date = profile.create_date;
        self.object.modified_date = profile.modified_date;
        self.object.new_record = false;

        let manifest = self.store.fetch_datastream_manifest(&pid)?;
        self.collection.union_manifest(&manifest);
        Ok(())
    }
}
