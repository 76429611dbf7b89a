//! Index projection rendering
//!
//! Derives the generic object-record document from an object's current
//! datastream state. The same fixed field set (`id`,
//! `system_create_date`, `system_modified_date`,
//! `active_fedora_model`) feeds both the search-index document and the
//! XML envelope fragment.

pub mod index_doc;
pub mod xml;

pub use index_doc::{populate_from_document, to_index_document, ProjectionOptions};
pub use xml::{append_object_fields, to_xml};
