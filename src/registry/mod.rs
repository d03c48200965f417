//! Backend Registry module.
//!
//! Holds every known backend together with its static capabilities and live
//! statistics. Outcome recording is the only state change in the system;
//! everything else reads snapshots.

mod backend;
mod error;

pub use backend::*;
pub use error::*;

use crate::learning::Outcome;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// The Backend Registry stores all known backends.
///
/// The id map is a `DashMap`; each backend guards its own statistics with a
/// dedicated mutex, so outcome reports for unrelated backends never contend.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{Backend, Capabilities, Registry};
///
/// let registry = Registry::new();
/// let caps = Capabilities::new(vec!["video/*".to_string()], 1).unwrap();
/// registry.add_backend(Backend::new("edge-video", caps)).unwrap();
///
/// assert_eq!(registry.backend_count(), 1);
/// assert!(registry.get("edge-video").is_ok());
/// ```
pub struct Registry {
    backends: DashMap<String, Arc<Backend>>,
}

impl Registry {
    /// Create a new empty Registry.
    pub fn new() -> Self {
        Self {
            backends: DashMap::new(),
        }
    }

    /// Register a backend.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateBackend` if the id is taken and
    /// `RegistryError::NoContentTypes` if the backend advertises nothing.
    pub fn add_backend(&self, backend: Backend) -> Result<(), RegistryError> {
        if backend.capabilities.content_types.is_empty() {
            return Err(RegistryError::NoContentTypes(backend.id));
        }

        match self.backends.entry(backend.id.clone()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateBackend(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(backend));
                Ok(())
            }
        }
    }

    /// Get a snapshot of one backend.
    pub fn get(&self, id: &str) -> Result<BackendSnapshot, RegistryError> {
        self.backend(id)
            .map(|backend| backend.snapshot())
            .ok_or_else(|| RegistryError::BackendNotFound(id.to_string()))
    }

    /// Get the shared handle of one backend.
    pub fn backend(&self, id: &str) -> Option<Arc<Backend>> {
        // Clone the Arc out so the shard lock is released before any stats lock.
        self.backends.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot every backend, ordered by id.
    ///
    /// Each backend's stats are copied under its own lock; the result is safe
    /// to iterate without holding anything.
    pub fn list(&self) -> Vec<BackendSnapshot> {
        let handles: Vec<Arc<Backend>> = self
            .backends
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut snapshots: Vec<BackendSnapshot> =
            handles.iter().map(|backend| backend.snapshot()).collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    /// Get the number of registered backends.
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Get the number of backends that are not disabled.
    pub fn enabled_count(&self) -> usize {
        self.backends
            .iter()
            .filter(|entry| !entry.value().is_disabled())
            .count()
    }

    /// Enable or disable a backend. Returns the previous disabled state.
    pub fn set_disabled(&self, id: &str, disabled: bool) -> Result<bool, RegistryError> {
        let backend = self
            .backend(id)
            .ok_or_else(|| RegistryError::BackendNotFound(id.to_string()))?;
        let previous = backend.set_disabled(disabled);
        if previous != disabled {
            tracing::info!(backend_id = %id, disabled, "Backend availability changed");
        }
        Ok(previous)
    }

    /// Fold an outcome into the backend's statistics.
    ///
    /// The update happens atomically under the backend's lock; concurrent
    /// calls for the same backend are applied one after another in lock
    /// acquisition order.
    pub fn record_outcome(
        &self,
        id: &str,
        outcome: &Outcome,
    ) -> Result<StatsSnapshot, RegistryError> {
        let backend = self
            .backend(id)
            .ok_or_else(|| RegistryError::BackendNotFound(id.to_string()))?;
        Ok(backend.apply_outcome(outcome))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
