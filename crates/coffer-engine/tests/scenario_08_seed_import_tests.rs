/// Scenario 8: Seed Import
///
/// Seeds replay through the ordinary session/save path: imported
/// objects land in both backends with their datastreams and
/// relationships.
mod common;

use std::io::Write as _;

use coffer_core::backend::SearchIndex as _;
use coffer_core::registry::ObjectType;
use coffer_engine::seed::import_seed;

const SEED: &str = r#"
schema_version: 1
objects:
  - pid: demo:100
    model: Collection
    label: Sample collection
    owner: curator
    datastreams:
      - dsid: DC
        kind: metadata
        fields:
          title: ["Sample collection"]
  - model: Item
    label: First item
    state: A
    datastreams:
      - dsid: PAGE1
        mime_type: text/plain
        content: "page one text"
      - kind: metadata
        dsid: descMetadata
        fields:
          creator: ["someone"]
    relationships:
      - predicate: isPartOf
        target: demo:100
"#;

fn write_seed(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("sample.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SEED.as_bytes()).unwrap();
    path
}

#[test]
fn test_scenario_08_import_seed_file() {
    // GIVEN a memory-backed session and a seed file
    let (session, store, index) = common::memory_session();
    let dir = tempfile::tempdir().unwrap();
    let path = write_seed(&dir);

    // WHEN the seed is imported
    let pids = import_seed(&session, &path).unwrap();

    // THEN both objects were created, the explicit pid honored and the
    // second one minted
    assert_eq!(pids.len(), 2);
    assert_eq!(pids[0].as_str(), "demo:100");
    assert_eq!(pids[1].as_str(), "demo:1");
    assert_eq!(store.object_count(), 2);

    // AND the datastreams went through the ordinary save path
    let mut collection_obj = session
        .load(&ObjectType::generic(), &pids[0])
        .unwrap();
    assert_eq!(collection_obj.object().label, "Sample collection");
    assert!(collection_obj.datastreams().unwrap().contains("DC"));

    let mut item = session.load(&ObjectType::generic(), &pids[1]).unwrap();
    assert_eq!(
        item.datastream_content("PAGE1").unwrap().as_deref(),
        Some(b"page one text".as_ref())
    );

    // AND relationships and models were indexed
    let doc = index.query(&pids[1]).unwrap().unwrap();
    assert_eq!(doc.values("rel_is_part_of"), ["info:fedora/demo:100"]);
    assert_eq!(doc.model(), Some("Item"));
    assert_eq!(doc.values("descmetadata_creator"), ["someone"]);
}

#[test]
fn test_scenario_08_rejects_unknown_schema_version() {
    let (session, _store, _index) = common::memory_session();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "schema_version: 9\nobjects: []\n").unwrap();

    let result = import_seed(&session, &path);
    assert!(matches!(
        result,
        Err(coffer_core::CofferError::InvalidInput { .. })
    ));
}

#[test]
fn test_scenario_08_missing_file_is_io_error() {
    let (session, _store, _index) = common::memory_session();
    let result = import_seed(&session, std::path::Path::new("/nonexistent/seed.yaml"));
    assert!(matches!(result, Err(coffer_core::CofferError::Io(_))));
}
