//! Pluggable index projection
//!
//! An external indexing integration may substitute a richer document
//! for the default projection. The hook is capability-detected: when
//! it declines (returns `None`), the engine falls back to the built-in
//! projector.

use coffer_core::backend::IndexDocument;
use coffer_core::collection::DatastreamCollection;
use coffer_core::errors::Result;
use coffer_core::model::DigitalObject;

/// Hook substituting a custom index projection
pub trait ProjectionHook: Send + Sync {
    /// Produce the document to publish for this object, or `None` to
    /// use the default projection.
    fn project(
        &self,
        object: &DigitalObject,
        model_name: &str,
        collection: &DatastreamCollection,
    ) -> Result<Option<IndexDocument>>;
}

/// Default hook: always defers to the built-in projector
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProjectionHook;

impl ProjectionHook for NoopProjectionHook {
    fn project(
        &self,
        _object: &DigitalObject,
        _model_name: &str,
        _collection: &DatastreamCollection,
    ) -> Result<Option<IndexDocument>> {
        Ok(None)
    }
}
