/// Scenario 4: Delete With Inbound References
///
/// Deleting an object first strips every inbound assertion from the
/// referencing objects (re-saving them), then removes the object from
/// the store and the index.
mod common;

use coffer_core::backend::SearchIndex as _;
use coffer_core::model::{Predicate, RelTarget};

#[test]
fn test_scenario_04_inbound_reference_cleanup_before_removal() {
    // GIVEN demo:1 and demo:2, where demo:2 asserts isPartOf demo:1
    let (session, store, index) = common::memory_session();
    let item = common::item_type();

    let mut parent = session.create(&item).unwrap();
    assert_eq!(parent.pid().as_str(), "demo:1");
    parent.save().unwrap();

    let mut child = session.create(&item).unwrap();
    assert_eq!(child.pid().as_str(), "demo:2");
    let parent_pid = parent.pid().clone();
    child
        .add_relationship(Predicate::IsPartOf, RelTarget::Object(parent_pid.clone()))
        .unwrap();
    child.save().unwrap();

    // Sanity: the index sees the inbound assertion
    assert_eq!(parent.parts_inbound().unwrap().len(), 1);

    // WHEN demo:1 is deleted
    let removed = parent.delete().unwrap();
    assert!(removed);

    // THEN demo:1 is gone from both backends
    assert_eq!(store.object_count(), 1);
    assert!(index.query(&parent_pid).unwrap().is_none());

    // AND demo:2 lost the relationship and was re-saved
    let child_pid = child.pid().clone();
    let mut reloaded = session
        .load(&coffer_core::registry::ObjectType::generic(), &child_pid)
        .unwrap();
    let rels = reloaded.relationships(false).unwrap();
    assert!(!rels.contains_key("isPartOf"));

    // AND demo:2's republished index document no longer carries it
    let doc = index.query(&child_pid).unwrap().unwrap();
    assert!(doc.values("rel_is_part_of").is_empty());
}

#[test]
fn test_scenario_04_delete_without_references() {
    let (session, store, index) = common::memory_session();
    let mut handle = session.create(&common::item_type()).unwrap();
    handle.save().unwrap();
    let pid = handle.pid().clone();

    assert!(handle.delete().unwrap());
    assert_eq!(store.object_count(), 0);
    assert!(index.query(&pid).unwrap().is_none());
}
