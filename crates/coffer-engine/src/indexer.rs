//! Index projection and index-based loading

use chrono::{DateTime, Utc};

use coffer_core::backend::IndexDocument;
use coffer_core::collection::DatastreamCollection;
use coffer_core::errors::{CofferError, Result};
use coffer_core::model::{DatastreamKind, DigitalObject, Predicate, RelTarget, Relationship};
use coffer_core::registry::ObjectType;
use coffer_core::relations;
use coffer_core::render::{self, ProjectionOptions};
use coffer_core_types::schema::{predicate_from_rel_field, RELS_EXT_ID};
use coffer_core_types::Pid;

use crate::handle::ObjectHandle;

impl ObjectHandle {
    /// Project the current state into an index document
    pub fn to_index_document(&mut self, options: ProjectionOptions) -> Result<IndexDocument> {
        self.ensure_relationships_loaded()?;
        render::to_index_document(
            &self.object,
            self.object_type.name(),
            &self.collection,
            options,
        )
    }

    /// Append the object's projection to an XML base document
    pub fn to_xml_fragment(&mut self, base: &mut String) -> Result<()> {
        self.ensure_relationships_loaded()?;
        render::append_object_fields(
            base,
            &self.object,
            self.object_type.name(),
            &self.collection,
        )
    }

    /// Standalone `<doc>` fragment of the object's projection
    pub fn to_xml(&mut self) -> Result<String> {
        self.ensure_relationships_loaded()?;
        render::to_xml(&self.object, self.object_type.name(), &self.collection)
    }

    /// Serialize and upsert the index document
    ///
    /// A configured projection hook may substitute a richer document;
    /// when it declines, the default projection is published.
    pub fn publish_index(&mut self) -> Result<()> {
        self.ensure_relationships_loaded()?;

        let substituted = match &self.hook {
            Some(hook) => hook.project(
                &self.object,
                self.object_type.name(),
                &self.collection,
            )?,
            None => None,
        };
        let document = match substituted {
            Some(doc) => doc,
            None => render::to_index_document(
                &self.object,
                self.object_type.name(),
                &self.collection,
                ProjectionOptions::default(),
            )?,
        };

        self.index.update(&document)?;
        tracing::debug!(pid = %self.object.pid(), "published index document");
        Ok(())
    }
}

fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Rebuild an object's working state from its index document
///
/// The object comes back non-new, stamped with the index's cached
/// dates; metadata statics populate their fields from the document;
/// the relationship graph is materialized eagerly from the `rel_`
/// fields. All reconstructed state is clean - it mirrors what the
/// index holds.
pub(crate) fn reconstruct(
    object_type: &ObjectType,
    pid: &Pid,
    document: &IndexDocument,
) -> Result<(DigitalObject, DatastreamCollection)> {
    let found = document.id().unwrap_or_default();
    if found != pid.as_str() {
        return Err(CofferError::IdentifierMismatch {
            requested: pid.to_string(),
            found: found.to_string(),
        });
    }

    let mut object = DigitalObject::new(pid.clone());
    object.new_record = false;
    object.create_date = parse_date(document.create_date());
    object.modified_date = parse_date(document.modified_date());

    let mut collection = DatastreamCollection::new();
    for mut ds in object_type.materialize_statics() {
        if ds.kind == DatastreamKind::Metadata {
            render::populate_from_document(&mut ds, document);
        }
        ds.mark_persisted();
        collection.insert(ds);
    }

    relations::ensure_rels_ext(&mut collection)?;
    let mut triples = Vec::new();
    for (field, values) in document.relationship_fields() {
        let Some(predicate) = predicate_from_rel_field(field) else {
            continue;
        };
        for value in values {
            triples.push(Relationship::new(
                pid.clone(),
                Predicate::from(predicate.clone()),
                RelTarget::from_uri_string(value),
            ));
        }
    }
    let ds = collection
        .get_mut(RELS_EXT_ID)
        .expect("RELS-EXT exists after ensure");
    ds.content = Some(serde_json::to_vec(&triples)?);
    ds.mark_persisted();

    tracing::debug!(pid = %pid, triples = triples.len(), "reconstructed object from index");
    Ok((object, collection))
}
