//! Inbound relationship views
//!
//! Assertions other objects make about this one are discovered through
//! the search index, which carries every object's relationship fields.

use std::collections::{BTreeMap, HashSet};

use coffer_core::errors::Result;
use coffer_core::model::{Predicate, RelTarget};
use coffer_core::relations;

use crate::handle::ObjectHandle;

impl ObjectHandle {
    /// All relationships grouped by predicate, targets as URIs
    ///
    /// Outbound assertions are always included; with `include_inbound`
    /// the index is queried for objects asserting a relationship
    /// pointing at this one and the sources are merged in.
    pub fn relationships(&mut self, include_inbound: bool) -> Result<BTreeMap<String, Vec<String>>> {
        self.ensure_relationships_loaded()?;
        let mut grouped = relations::outbound(&self.collection)?;

        if include_inbound {
            for assertion in self.index.query_relationships_to(&self.object.uri())? {
                let entry = grouped
                    .entry(assertion.predicate.as_str().to_string())
                    .or_default();
                let source = assertion.source.uri();
                if !entry.contains(&source) {
                    entry.push(source);
                }
            }
        }

        Ok(grouped)
    }

    /// Objects asserting `isPartOf` pointing at this one
    pub fn parts_inbound(&mut self) -> Result<Vec<RelTarget>> {
        Ok(self
            .index
            .query_relationships_to(&self.object.uri())?
            .into_iter()
            .filter(|a| a.predicate == Predicate::IsPartOf)
            .map(|a| RelTarget::Object(a.source))
            .collect())
    }

    /// Deduplicated union of inbound and outbound part relations
    ///
    /// Observing legacy collection-member assertions alongside part
    /// relations is a consistency anomaly: logged, never raised.
    pub fn parts(&mut self) -> Result<Vec<RelTarget>> {
        let inbound = self.parts_inbound()?;
        let outbound = self.parts_outbound()?;

        let mut seen = HashSet::new();
        let mut parts = Vec::new();
        for target in inbound.into_iter().chain(outbound) {
            if seen.insert(target.uri_string()) {
                parts.push(target);
            }
        }

        let members = relations::collection_members(&self.collection)?;
        if !members.is_empty() && !parts.is_empty() {
            tracing::warn!(
                pid = %self.object.pid(),
                "legacy collection-member assertions observed alongside part relations"
            );
        }

        Ok(parts)
    }
}
