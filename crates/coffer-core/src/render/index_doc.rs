use crate::backend::IndexDocument;
use crate::collection::DatastreamCollection;
use crate::errors::Result;
use crate::model::{Datastream, DigitalObject};
use crate::relations;
use coffer_core_types::schema::{CREATE_DATE_FIELD, ID_FIELD, MODIFIED_DATE_FIELD, MODEL_FIELD};

/// Options for [`to_index_document`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionOptions {
    /// Restrict the projection to identity and model: only `id` and
    /// `active_fedora_model` among the fixed fields, and no
    /// relationship fields. Metadata datastreams still contribute.
    pub model_only: bool,
}

/// Index-document field prefix for one datastream's contributions
/// (`DC` -> `dc_`, `RELS-EXT` -> `rels_ext_`)
pub fn field_prefix(dsid: &str) -> String {
    let mut prefix: String = dsid
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect();
    prefix.push('_');
    prefix
}

/// Project the object and its datastreams into an index document
pub fn to_index_document(
    object: &DigitalObject,
    model_name: &str,
    collection: &DatastreamCollection,
    options: ProjectionOptions,
) -> Result<IndexDocument> {
    let mut doc = IndexDocument::new();
    doc.set(ID_FIELD, object.pid().as_str());
    doc.set(MODEL_FIELD, model_name);

    if !options.model_only {
        if let Some(date) = object.create_date {
            doc.set(CREATE_DATE_FIELD, date.to_rfc3339());
        }
        if let Some(date) = object.modified_date {
            doc.set(MODIFIED_DATE_FIELD, date.to_rfc3339());
        }
    }

    for ds in collection.metadata_streams() {
        let prefix = field_prefix(&ds.dsid);
        for (name, values) in &ds.fields {
            for value in values {
                doc.append(format!("{prefix}{name}"), value.clone());
            }
        }
    }

    if !options.model_only {
        for rel in relations::triples(collection)? {
            doc.append(rel.predicate.index_field(), rel.target.uri_string());
        }
    }

    Ok(doc)
}

/// Populate a metadata datastream's fields from an index document
///
/// The faster, possibly-stale alternative to fetching content from the
/// object store: fields carrying this datastream's prefix are copied
/// in. The dirty flag is left untouched - the populated state mirrors
/// what the index already holds.
pub fn populate_from_document(ds: &mut Datastream, doc: &IndexDocument) {
    let prefix = field_prefix(&ds.dsid);
    for (field, values) in doc.fields() {
        if let Some(name) = field.strip_prefix(&prefix) {
            ds.fields.insert(name.to_string(), values.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DatastreamKind, Predicate, RelTarget};
    use chrono::TimeZone;
    use coffer_core_types::Pid;

    fn sample() -> (DigitalObject, DatastreamCollection) {
        let mut object = DigitalObject::new(Pid::parse("demo:1").unwrap());
        object.create_date = Some(chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        object.modified_date = Some(chrono::Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap());

        let mut collection = DatastreamCollection::new();
        let mut dc = Datastream::new("DC", DatastreamKind::Metadata);
        dc.set_field("title", vec!["A title".to_string()]);
        collection.insert(dc);
        relations::add(
            &mut collection,
            object.pid(),
            Predicate::IsPartOf,
            RelTarget::Object(Pid::parse("demo:2").unwrap()),
        )
        .unwrap();

        (object, collection)
    }

    #[test]
    fn test_fixed_fields_and_contributions() {
        let (object, collection) = sample();
        let doc =
            to_index_document(&object, "Item", &collection, ProjectionOptions::default()).unwrap();

        assert_eq!(doc.id(), Some("demo:1"));
        assert_eq!(doc.model(), Some("Item"));
        assert!(doc.create_date().unwrap().starts_with("2024-03-01"));
        assert_eq!(doc.values("dc_title"), ["A title"]);
        assert_eq!(doc.values("rel_is_part_of"), ["info:fedora/demo:2"]);
    }

    #[test]
    fn test_model_only_skips_dates_and_relationships() {
        let (object, collection) = sample();
        let doc = to_index_document(
            &object,
            "Item",
            &collection,
            ProjectionOptions { model_only: true },
        )
        .unwrap();

        assert_eq!(doc.id(), Some("demo:1"));
        assert_eq!(doc.model(), Some("Item"));
        assert!(doc.create_date().is_none());
        assert!(doc.values("rel_is_part_of").is_empty());
        // Metadata still contributes.
        assert_eq!(doc.values("dc_title"), ["A title"]);
    }

    #[test]
    fn test_field_prefix_normalizes() {
        assert_eq!(field_prefix("DC"), "dc_");
        assert_eq!(field_prefix("RELS-EXT"), "rels_ext_");
        assert_eq!(field_prefix("descMetadata"), "descmetadata_");
    }

    #[test]
    fn test_populate_round_trip() {
        let (object, collection) = sample();
        let doc =
            to_index_document(&object, "Item", &collection, ProjectionOptions::default()).unwrap();

        let mut fresh = Datastream::new("DC", DatastreamKind::Metadata);
        fresh.mark_persisted();
        populate_from_document(&mut fresh, &doc);

        assert_eq!(fresh.field_first("title"), Some("A title"));
        assert!(!fresh.dirty);
    }
}
