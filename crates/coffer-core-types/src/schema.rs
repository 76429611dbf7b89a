//! Fixed schema vocabulary
//!
//! Field and datastream names that the object store envelope and the
//! search index document share. Both backends consume the same
//! object-record field set, so the names live here rather than in
//! either backend's crate.

/// Reserved id of the relationship-bearing datastream (singleton per
/// object).
pub const RELS_EXT_ID: &str = "RELS-EXT";

/// Reserved id of the descriptive-metadata datastream every object
/// carries.
pub const DC_ID: &str = "DC";

/// Default prefix for minted datastream ids.
pub const DEFAULT_DSID_PREFIX: &str = "DS";

/// Object identifier field.
pub const ID_FIELD: &str = "id";

/// Backend-stamped creation date field.
pub const CREATE_DATE_FIELD: &str = "system_create_date";

/// Backend-stamped modification date field.
pub const MODIFIED_DATE_FIELD: &str = "system_modified_date";

/// Model (concrete object type) field.
pub const MODEL_FIELD: &str = "active_fedora_model";

/// Prefix of relationship fields in an index document.
pub const REL_FIELD_PREFIX: &str = "rel_";

/// Index document schema version recorded by backends that persist
/// documents.
pub const INDEX_SCHEMA_VERSION: u32 = 1;

/// Index/XML field name carrying a relationship predicate.
///
/// Predicates use camel-case wire names (`isPartOf`); field names are
/// the snake-cased form with the `rel_` prefix (`rel_is_part_of`).
pub fn rel_field_name(predicate: &str) -> String {
    let mut out = String::with_capacity(REL_FIELD_PREFIX.len() + predicate.len() + 4);
    out.push_str(REL_FIELD_PREFIX);
    for ch in predicate.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Inverse of [`rel_field_name`]: recover the camel-case predicate from
/// an index field name. Returns `None` for non-relationship fields.
pub fn predicate_from_rel_field(field: &str) -> Option<String> {
    let rest = field.strip_prefix(REL_FIELD_PREFIX)?;
    let mut out = String::with_capacity(rest.len());
    let mut upper_next = false;
    for ch in rest.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    Some(out)
}
