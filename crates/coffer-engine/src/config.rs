use coffer_core::relations::RemoveMissingPolicy;

/// Engine configuration
///
/// Explicit flags threaded into every session; there is no global
/// toggle.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project and publish to the search index after metadata-dirty
    /// saves, and delete index documents alongside objects
    pub index_updates_enabled: bool,

    /// What removing a non-existent relationship does to the dirty flag
    pub remove_missing_policy: RemoveMissingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_updates_enabled: true,
            remove_missing_policy: RemoveMissingPolicy::MarkDirty,
        }
    }
}

impl EngineConfig {
    /// Disable index projection and publication
    pub fn without_index_updates(mut self) -> Self {
        self.index_updates_enabled = false;
        self
    }

    pub fn remove_missing_policy(mut self, policy: RemoveMissingPolicy) -> Self {
        self.remove_missing_policy = policy;
        self
    }
}
