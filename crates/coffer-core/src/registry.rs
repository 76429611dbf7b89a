//! Class-scoped datastream descriptors
//!
//! Every concrete object type carries an immutable-after-build table of
//! static datastream specs (fixed name, seeded into each new instance)
//! and named groups (pattern-based families sharing an id prefix). The
//! table is built once by [`ObjectTypeBuilder`] at type-definition time
//! and shared by reference across all instances; it is never mutated
//! per-instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Datastream, DatastreamKind};

/// Initializer applied to a static datastream when an instance
/// materializes it, letting the declarer configure structured fields.
/// Persisted attributes are merged over these defaults afterwards.
pub type DatastreamInitializer = fn(&mut Datastream);

/// Fixed datastream spec: every instance of the type gets one
/// datastream of this name and kind.
#[derive(Clone)]
pub struct StaticDatastreamSpec {
    pub name: String,
    pub kind: DatastreamKind,
    pub initializer: DatastreamInitializer,
}

impl std::fmt::Debug for StaticDatastreamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticDatastreamSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Pattern-based datastream group: members share an id prefix and,
/// optionally, a required mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedGroup {
    pub name: String,
    pub prefix: String,
    pub kind: DatastreamKind,
    pub mime_type: Option<String>,
}

/// Options for declaring a named group
///
/// Omitted prefix derives from the upper-cased group name; omitted kind
/// defaults to a generic content-bearing datastream.
#[derive(Debug, Clone, Default)]
pub struct GroupSpec {
    pub prefix: Option<String>,
    pub kind: Option<DatastreamKind>,
    pub mime_type: Option<String>,
}

impl GroupSpec {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn kind(mut self, kind: DatastreamKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }
}

/// Immutable descriptor table for one concrete object type
///
/// Group accessors are deliberately ordinary operations keyed by group
/// name (`DatastreamCollection::group_members` /
/// `::add_group_member`) dispatching through this table; nothing is
/// synthesized at declaration time.
#[derive(Debug, Clone)]
pub struct ObjectType {
    name: String,
    statics: Vec<StaticDatastreamSpec>,
    groups: BTreeMap<String, NamedGroup>,
}

impl ObjectType {
    /// Start declaring a type with the given model name
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        ObjectTypeBuilder {
            name: name.into(),
            statics: Vec::new(),
            groups: BTreeMap::new(),
        }
    }

    /// A bare type with no statics or groups, for callers that handle
    /// objects of unknown concrete type (e.g. inbound-reference
    /// cleanup).
    pub fn generic() -> Arc<ObjectType> {
        ObjectType::builder("GenericObject").build()
    }

    /// The model name asserted through the `hasModel` relationship
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URI form of the model identifier
    pub fn model_uri(&self) -> String {
        format!("info:fedora/model:{}", self.name)
    }

    pub fn statics(&self) -> &[StaticDatastreamSpec] {
        &self.statics
    }

    pub fn group(&self, name: &str) -> Option<&NamedGroup> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &NamedGroup> {
        self.groups.values()
    }

    /// Materialize one datastream per static spec with initializer
    /// defaults applied. The caller merges persisted attributes over
    /// the defaults for objects that already exist in the backend.
    pub fn materialize_statics(&self) -> Vec<Datastream> {
        self.statics
            .iter()
            .map(|spec| {
                let mut ds = Datastream::new(spec.name.clone(), spec.kind);
                (spec.initializer)(&mut ds);
                ds
            })
            .collect()
    }
}

/// Builder for [`ObjectType`]; consumed by `build`, after which the
/// table never changes.
pub struct ObjectTypeBuilder {
    name: String,
    statics: Vec<StaticDatastreamSpec>,
    groups: BTreeMap<String, NamedGroup>,
}

impl ObjectTypeBuilder {
    /// Register a fixed datastream spec
    pub fn static_datastream(
        mut self,
        name: impl Into<String>,
        kind: DatastreamKind,
        initializer: DatastreamInitializer,
    ) -> Self {
        self.statics.push(StaticDatastreamSpec {
            name: name.into(),
            kind,
            initializer,
        });
        self
    }

    /// Register a pattern-based group
    pub fn named_group(mut self, name: impl Into<String>, spec: GroupSpec) -> Self {
        let name = name.into();
        let group = NamedGroup {
            prefix: spec.prefix.unwrap_or_else(|| name.to_uppercase()),
            kind: spec.kind.unwrap_or(DatastreamKind::Content),
            mime_type: spec.mime_type,
            name: name.clone(),
        };
        self.groups.insert(name, group);
        self
    }

    /// Freeze the table
    pub fn build(self) -> Arc<ObjectType> {
        Arc::new(ObjectType {
            name: self.name,
            statics: self.statics,
            groups: self.groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_title(ds: &mut Datastream) {
        ds.set_field("title", vec![String::new()]);
    }

    #[test]
    fn test_group_prefix_derives_from_name() {
        let ty = ObjectType::builder("Book")
            .named_group("image", GroupSpec::default())
            .build();

        let group = ty.group("image").unwrap();
        assert_eq!(group.prefix, "IMAGE");
        assert_eq!(group.kind, DatastreamKind::Content);
        assert!(group.mime_type.is_none());
    }

    #[test]
    fn test_group_explicit_spec() {
        let ty = ObjectType::builder("Book")
            .named_group(
                "page",
                GroupSpec::default()
                    .prefix("PG")
                    .kind(DatastreamKind::Metadata)
                    .mime_type("application/json"),
            )
            .build();

        let group = ty.group("page").unwrap();
        assert_eq!(group.prefix, "PG");
        assert_eq!(group.kind, DatastreamKind::Metadata);
    }

    #[test]
    fn test_materialize_statics_applies_initializer() {
        let ty = ObjectType::builder("Book")
            .static_datastream("DC", DatastreamKind::Metadata, seed_title)
            .build();

        let statics = ty.materialize_statics();
        assert_eq!(statics.len(), 1);
        assert_eq!(statics[0].dsid, "DC");
        assert!(statics[0].new_record);
        assert!(statics[0].fields.contains_key("title"));
    }

    #[test]
    fn test_model_uri() {
        let ty = ObjectType::builder("Book").build();
        assert_eq!(ty.model_uri(), "info:fedora/model:Book");
    }
}
