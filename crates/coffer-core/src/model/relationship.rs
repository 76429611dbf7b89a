use serde::{Deserialize, Serialize};

use coffer_core_types::schema::rel_field_name;
use coffer_core_types::Pid;

/// Relationship predicate
///
/// Closed set of the predicates the engine interprets, plus an escape
/// hatch for arbitrary assertions. Wire names are camel-case; index
/// field names are derived via [`Predicate::index_field`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Predicate {
    /// Asserts the concrete object type (`hasModel`)
    HasModel,
    /// Outbound collection membership (`hasCollectionMember`)
    HasCollectionMember,
    /// This object is part of the target (`isPartOf`)
    IsPartOf,
    /// The target is part of this object (`hasPart`)
    HasPart,
    /// Any other predicate, carried verbatim
    Other(String),
}

impl Predicate {
    /// Camel-case wire name, as serialized into relationship content
    pub fn as_str(&self) -> &str {
        match self {
            Predicate::HasModel => "hasModel",
            Predicate::HasCollectionMember => "hasCollectionMember",
            Predicate::IsPartOf => "isPartOf",
            Predicate::HasPart => "hasPart",
            Predicate::Other(name) => name,
        }
    }

    /// Index document field carrying assertions of this predicate
    /// (`rel_is_part_of` for `isPartOf`)
    pub fn index_field(&self) -> String {
        rel_field_name(self.as_str())
    }
}

impl From<String> for Predicate {
    fn from(name: String) -> Self {
        match name.as_str() {
            "hasModel" => Predicate::HasModel,
            "hasCollectionMember" => Predicate::HasCollectionMember,
            "isPartOf" => Predicate::IsPartOf,
            "hasPart" => Predicate::HasPart,
            _ => Predicate::Other(name),
        }
    }
}

impl From<Predicate> for String {
    fn from(predicate: Predicate) -> Self {
        predicate.as_str().to_string()
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relationship target: another object or an arbitrary URI
///
/// Construction normalizes: a URI in the object scheme becomes
/// `Object`. Equality and hashing go through the serialized URI form so
/// the two spellings of the same target compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RelTarget {
    Object(Pid),
    Uri(String),
}

impl RelTarget {
    /// Classify a raw string as an object reference or a plain URI
    pub fn from_uri_string(value: &str) -> Self {
        match Pid::from_uri(value) {
            Some(pid) => RelTarget::Object(pid),
            None => RelTarget::Uri(value.to_string()),
        }
    }

    /// The serialized URI form of the target
    pub fn uri_string(&self) -> String {
        match self {
            RelTarget::Object(pid) => pid.uri(),
            RelTarget::Uri(uri) => uri.clone(),
        }
    }

    /// The target pid, when the target is an object reference
    pub fn pid(&self) -> Option<&Pid> {
        match self {
            RelTarget::Object(pid) => Some(pid),
            RelTarget::Uri(_) => None,
        }
    }
}

impl PartialEq for RelTarget {
    fn eq(&self, other: &Self) -> bool {
        self.uri_string() == other.uri_string()
    }
}

impl Eq for RelTarget {}

impl std::hash::Hash for RelTarget {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uri_string().hash(state);
    }
}

impl From<&Pid> for RelTarget {
    fn from(pid: &Pid) -> Self {
        RelTarget::Object(pid.clone())
    }
}

impl From<String> for RelTarget {
    fn from(value: String) -> Self {
        RelTarget::from_uri_string(&value)
    }
}

impl From<RelTarget> for String {
    fn from(target: RelTarget) -> Self {
        target.uri_string()
    }
}

impl std::fmt::Display for RelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri_string())
    }
}

/// A subject-predicate-object assertion
///
/// The subject is always the owning object for outbound assertions;
/// triples live only as serialized content inside the `RELS-EXT`
/// datastream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub subject: Pid,
    pub predicate: Predicate,
    pub target: RelTarget,
}

impl Relationship {
    pub fn new(subject: Pid, predicate: Predicate, target: RelTarget) -> Self {
        Self {
            subject,
            predicate,
            target,
        }
    }

    /// Check predicate and target against a query pair
    pub fn matches(&self, predicate: &Predicate, target: &RelTarget) -> bool {
        &self.predicate == predicate && &self.target == target
    }
}
