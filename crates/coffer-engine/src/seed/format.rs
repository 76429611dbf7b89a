//! Seed format v1 schema

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level seed file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedV1 {
    /// Schema version (must be 1 for this format)
    pub schema_version: u32,

    /// Objects to import
    pub objects: Vec<SeedObject>,
}

/// One object in a seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedObject {
    /// Explicit pid; minted by the store when absent
    #[serde(default)]
    pub pid: Option<String>,

    /// Model name asserted through `hasModel`; defaults to the generic
    /// model
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub label: String,

    /// State code (`A`, `I`, `D`)
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub datastreams: Vec<SeedDatastream>,

    #[serde(default)]
    pub relationships: Vec<SeedRelationship>,
}

/// One datastream in a seed
///
/// Content is either inline text (`content`) or base64
/// (`content_base64`) for binary payloads; metadata datastreams carry
/// `fields` instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedDatastream {
    #[serde(default)]
    pub dsid: Option<String>,

    /// Named group to append through; validated against the object's
    /// type
    #[serde(default)]
    pub group: Option<String>,

    /// Kind for group-less datastreams: `content` (default) or
    /// `metadata`
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub content_base64: Option<String>,

    #[serde(default)]
    pub fields: BTreeMap<String, Vec<String>>,
}

/// One outbound relationship in a seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRelationship {
    /// Camel-case predicate name (`isPartOf`, `hasPart`, ...)
    pub predicate: String,

    /// Target pid or URI
    pub target: String,
}
