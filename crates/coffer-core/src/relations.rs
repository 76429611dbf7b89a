//! Outbound relationship graph
//!
//! Assertions live only as the serialized content of the reserved
//! `RELS-EXT` datastream - there is no separate relationship store.
//! The content is a JSON array of subject-predicate-object triples;
//! every mutation rewrites the content and marks the datastream dirty,
//! so the ordinary save cycle persists the graph.
//!
//! Inbound views (assertions other objects make about this one) need
//! the search index and live in the engine crate.

use std::collections::BTreeMap;

use crate::collection::{AddOptions, DatastreamCollection};
use crate::errors::{CofferError, Result};
use crate::model::{Datastream, DatastreamKind, Predicate, RelTarget, Relationship};
use coffer_core_types::schema::RELS_EXT_ID;
use coffer_core_types::Pid;

/// What `remove` does when no matching triple exists
///
/// The observed behavior marks the datastream dirty unconditionally;
/// `Noop` makes removal idempotent instead. Explicit rather than
/// guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveMissingPolicy {
    /// Mark the relationship datastream dirty even when nothing matched
    #[default]
    MarkDirty,
    /// Leave the datastream untouched when nothing matched
    Noop,
}

/// Ensure the reserved relationship datastream exists, registering it
/// through the collection's ordinary `add` path on first access.
pub fn ensure_rels_ext(collection: &mut DatastreamCollection) -> Result<()> {
    if !collection.contains(RELS_EXT_ID) {
        let mut ds = Datastream::new(RELS_EXT_ID, DatastreamKind::Relations);
        ds.label = "Relationships".to_string();
        collection.add(ds, AddOptions::default())?;
    }
    Ok(())
}

/// Parse the current triples
///
/// An absent datastream or unfetched/empty content parses as no
/// triples.
pub fn triples(collection: &DatastreamCollection) -> Result<Vec<Relationship>> {
    let Some(ds) = collection.get(RELS_EXT_ID) else {
        return Ok(Vec::new());
    };
    let Some(content) = ds.content.as_deref() else {
        return Ok(Vec::new());
    };
    if content.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(content).map_err(|err| CofferError::MalformedRelationships {
        reason: err.to_string(),
    })
}

fn write_triples(collection: &mut DatastreamCollection, triples: &[Relationship]) -> Result<()> {
    ensure_rels_ext(collection)?;
    let bytes = serde_json::to_vec(triples)?;
    let ds = collection
        .get_mut(RELS_EXT_ID)
        .expect("RELS-EXT exists after ensure");
    ds.set_content(bytes);
    Ok(())
}

/// Assert a triple with subject = the owning object
///
/// No-ops (returning `false`) when an identical triple already exists;
/// otherwise appends it and marks the datastream dirty.
pub fn add(
    collection: &mut DatastreamCollection,
    subject: &Pid,
    predicate: Predicate,
    target: RelTarget,
) -> Result<bool> {
    ensure_rels_ext(collection)?;
    let mut current = triples(collection)?;
    if current.iter().any(|rel| rel.matches(&predicate, &target)) {
        return Ok(false);
    }
    tracing::debug!(subject = %subject, predicate = %predicate, target = %target, "asserting relationship");
    current.push(Relationship::new(subject.clone(), predicate, target));
    write_triples(collection, &current)?;
    Ok(true)
}

/// Remove a matching triple
///
/// Returns whether a triple was removed. On no match, the
/// `RemoveMissingPolicy` decides whether the datastream is still marked
/// dirty.
pub fn remove(
    collection: &mut DatastreamCollection,
    predicate: &Predicate,
    target: &RelTarget,
    policy: RemoveMissingPolicy,
) -> Result<bool> {
    ensure_rels_ext(collection)?;
    let mut current = triples(collection)?;
    let before = current.len();
    current.retain(|rel| !rel.matches(predicate, target));

    if current.len() != before {
        write_triples(collection, &current)?;
        Ok(true)
    } else {
        if policy == RemoveMissingPolicy::MarkDirty {
            if let Some(ds) = collection.get_mut(RELS_EXT_ID) {
                ds.dirty = true;
            }
        }
        Ok(false)
    }
}

/// Outbound assertions grouped by predicate wire name, targets as URIs
pub fn outbound(collection: &DatastreamCollection) -> Result<BTreeMap<String, Vec<String>>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for rel in triples(collection)? {
        grouped
            .entry(rel.predicate.as_str().to_string())
            .or_default()
            .push(rel.target.uri_string());
    }
    Ok(grouped)
}

/// Targets of one outbound predicate
pub fn outbound_targets(
    collection: &DatastreamCollection,
    predicate: &Predicate,
) -> Result<Vec<RelTarget>> {
    Ok(triples(collection)?
        .into_iter()
        .filter(|rel| &rel.predicate == predicate)
        .map(|rel| rel.target)
        .collect())
}

/// Outbound `hasCollectionMember` targets
pub fn collection_members(collection: &DatastreamCollection) -> Result<Vec<RelTarget>> {
    outbound_targets(collection, &Predicate::HasCollectionMember)
}

/// Outbound `isPartOf` targets (what this object is part of)
pub fn part_of(collection: &DatastreamCollection) -> Result<Vec<RelTarget>> {
    outbound_targets(collection, &Predicate::IsPartOf)
}

/// Outbound `hasPart` targets
pub fn parts_outbound(collection: &DatastreamCollection) -> Result<Vec<RelTarget>> {
    outbound_targets(collection, &Predicate::HasPart)
}
