//! XML fragment projection
//!
//! Renders the same field set as the index document into the object
//! store's XML envelope form: `<field name="...">value</field>`
//! elements appended to a caller-supplied document string.

use crate::collection::DatastreamCollection;
use crate::errors::Result;
use crate::model::DigitalObject;
use crate::relations;
use crate::render::index_doc::field_prefix;
use coffer_core_types::schema::{CREATE_DATE_FIELD, ID_FIELD, MODIFIED_DATE_FIELD, MODEL_FIELD};

/// Escape a string for XML text and attribute content
///
/// Escapes: ampersand, angle brackets, double quotes
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Append one `<field>` element
pub fn append_field(doc: &mut String, name: &str, value: &str) {
    doc.push_str("<field name=\"");
    doc.push_str(&escape_xml(name));
    doc.push_str("\">");
    doc.push_str(&escape_xml(value));
    doc.push_str("</field>");
}

/// Append the object's projection to a base document
///
/// Fixed fields first (identifier, dates, type label), then every
/// metadata datastream's fields, then relationship assertions.
pub fn append_object_fields(
    doc: &mut String,
    object: &DigitalObject,
    model_name: &str,
    collection: &DatastreamCollection,
) -> Result<()> {
    append_field(doc, ID_FIELD, object.pid().as_str());
    if let Some(date) = object.create_date {
        append_field(doc, CREATE_DATE_FIELD, &date.to_rfc3339());
    }
    if let Some(date) = object.modified_date {
        append_field(doc, MODIFIED_DATE_FIELD, &date.to_rfc3339());
    }
    append_field(doc, MODEL_FIELD, model_name);

    for ds in collection.metadata_streams() {
        let prefix = field_prefix(&ds.dsid);
        for (name, values) in &ds.fields {
            for value in values {
                append_field(doc, &format!("{prefix}{name}"), value);
            }
        }
    }

    for rel in relations::triples(collection)? {
        append_field(doc, &rel.predicate.index_field(), &rel.target.uri_string());
    }

    Ok(())
}

/// Render a standalone `<doc>` fragment
pub fn to_xml(
    object: &DigitalObject,
    model_name: &str,
    collection: &DatastreamCollection,
) -> Result<String> {
    let mut doc = String::from("<doc>");
    append_object_fields(&mut doc, object, model_name, collection)?;
    doc.push_str("</doc>");
    Ok(doc)
}
