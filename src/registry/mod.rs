//! Registry of named flow engines.
//!
//! The registry maps opaque caller-chosen identifiers to engines,
//! creating each lazily on first lookup. It is an explicitly constructed,
//! explicitly owned object: build one at application start, share it by
//! cloning the `Arc` it hands out (or wrapping the registry itself in
//! one), and tear it down with [`FlowRegistry::clear_all`] at shutdown or
//! between tests.

use crate::engine::FlowEngine;
use crate::snapshot::{FlowSnapshot, SnapshotError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from identifier to [`FlowEngine`] instance.
///
/// The backing map is created on the first
/// [`get_or_create`](Self::get_or_create) and dropped again by
/// [`clear_all`](Self::clear_all); [`list_all`](Self::list_all) exposes
/// the difference between "never initialized" and "initialized but
/// empty".
///
/// # Example
///
/// ```rust
/// use flowstate::registry::FlowRegistry;
///
/// let registry = FlowRegistry::new();
/// let engine = registry.get_or_create("onboarding");
/// let same = registry.get_or_create("onboarding");
/// assert!(std::sync::Arc::ptr_eq(&engine, &same));
///
/// registry.remove("onboarding");
/// let fresh = registry.get_or_create("onboarding");
/// assert!(!std::sync::Arc::ptr_eq(&engine, &fresh));
/// ```
#[derive(Default)]
pub struct FlowRegistry {
    engines: Mutex<Option<HashMap<String, Arc<FlowEngine>>>>,
}

impl FlowRegistry {
    /// Create a registry with no backing map yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the engine for `identifier`, creating and storing a fresh
    /// empty one on first use. Never fails.
    pub fn get_or_create(&self, identifier: &str) -> Arc<FlowEngine> {
        let mut engines = self.engines.lock();
        let map = engines.get_or_insert_with(HashMap::new);
        map.entry(identifier.to_string())
            .or_insert_with(|| Arc::new(FlowEngine::new(identifier)))
            .clone()
    }

    /// Remove the mapping for `identifier`, if present.
    pub fn remove(&self, identifier: &str) {
        let mut engines = self.engines.lock();
        if let Some(map) = engines.as_mut() {
            map.remove(identifier);
        }
    }

    /// Drop every engine and return the registry to its uninitialized
    /// state.
    pub fn clear_all(&self) {
        let mut engines = self.engines.lock();
        *engines = None;
    }

    /// Diagnostic accessor: every current mapping, or `None` when the
    /// registry was never initialized (or has been cleared).
    pub fn list_all(&self) -> Option<HashMap<String, Arc<FlowEngine>>> {
        self.engines.lock().clone()
    }

    /// Recreate an engine from a snapshot under its recorded identifier.
    ///
    /// Looks up or creates the engine, then restores the snapshot's
    /// states, transitions, current state, and history. Callback
    /// providers and handler bindings are not part of a snapshot;
    /// re-attaching them is the caller's responsibility.
    pub fn rehydrate(&self, snapshot: &FlowSnapshot) -> Result<Arc<FlowEngine>, SnapshotError> {
        let engine = self.get_or_create(&snapshot.identifier);
        engine.restore(snapshot.clone())?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_registry_lists_none() {
        let registry = FlowRegistry::new();
        assert!(registry.list_all().is_none());
    }

    #[test]
    fn get_or_create_is_idempotent_per_identifier() {
        let registry = FlowRegistry::new();
        let first = registry.get_or_create("x");
        let second = registry.get_or_create("x");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.identifier(), "x");

        let other = registry.get_or_create("y");
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.list_all().unwrap().len(), 2);
    }

    #[test]
    fn remove_yields_a_fresh_engine_next_time() {
        let registry = FlowRegistry::new();
        let original = registry.get_or_create("x");
        original.add_state("A");

        registry.remove("x");
        let fresh = registry.get_or_create("x");
        assert!(!Arc::ptr_eq(&original, &fresh));
        assert!(fresh.states().is_empty());
    }

    #[test]
    fn remove_absent_identifier_is_a_no_op() {
        let registry = FlowRegistry::new();
        registry.remove("missing");
        assert!(registry.list_all().is_none());

        registry.get_or_create("x");
        registry.remove("missing");
        assert_eq!(registry.list_all().unwrap().len(), 1);
    }

    #[test]
    fn rehydrate_restores_under_the_recorded_identifier() {
        let registry = FlowRegistry::new();
        let engine = registry.get_or_create("wizard");
        engine.add_state("A").add_state("B");
        engine
            .add_transition("A", "B")
            .unwrap()
            .set_initial_state("A")
            .unwrap();
        engine.move_to("B").unwrap();
        let snapshot = engine.snapshot();

        registry.clear_all();

        let restored = registry.rehydrate(&snapshot).unwrap();
        assert_eq!(restored.identifier(), "wizard");
        assert_eq!(restored.current_state().as_deref(), Some("B"));
        assert_eq!(restored.history().len(), 1);
        assert!(registry.list_all().unwrap().contains_key("wizard"));
    }

    #[test]
    fn clear_all_returns_to_uninitialized() {
        let registry = FlowRegistry::new();
        registry.get_or_create("x");
        registry.get_or_create("y");
        assert_eq!(registry.list_all().unwrap().len(), 2);

        registry.clear_all();
        assert!(registry.list_all().is_none());
    }
}
