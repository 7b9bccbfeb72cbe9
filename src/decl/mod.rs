//! Declarative flow configuration.
//!
//! A [`FlowDecl`] is a static description of a machine's wiring: its
//! state list, transition list, and initial state. Hosts that keep flow
//! definitions alongside their own objects (or in configuration files;
//! the type is serde-derived) replay one through the builder calls in a
//! fixed order: all states, then all transitions, then the initial
//! state.

use crate::core::FlowError;
use crate::engine::FlowEngine;
use serde::{Deserialize, Serialize};

/// Static declaration of a flow's states, transitions, and initial
/// state.
///
/// # Example
///
/// ```rust
/// use flowstate::decl::FlowDecl;
/// use flowstate::engine::FlowEngine;
///
/// # fn main() -> Result<(), flowstate::core::FlowError> {
/// let decl = FlowDecl {
///     states: vec!["idle".into(), "busy".into()],
///     transitions: vec![
///         ("idle".into(), "busy".into()),
///         ("busy".into(), "idle".into()),
///     ],
///     initial: "idle".into(),
/// };
///
/// let engine = FlowEngine::new("worker");
/// decl.configure(&engine)?;
/// assert_eq!(engine.current_state().as_deref(), Some("idle"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowDecl {
    /// State names, in the order they should be added.
    pub states: Vec<String>,
    /// `(from, to)` pairs, each referencing declared states.
    pub transitions: Vec<(String, String)>,
    /// The state the machine starts in.
    pub initial: String,
}

impl FlowDecl {
    /// Replay this declaration through `engine`'s builder calls.
    ///
    /// Order is fixed: states, then transitions, then the initial state.
    /// Builder failures surface unchanged.
    pub fn configure(&self, engine: &FlowEngine) -> Result<(), FlowError> {
        for state in &self.states {
            engine.add_state(state);
        }
        for (from, to) in &self.transitions {
            engine.add_transition(from, to)?;
        }
        engine.set_initial_state(&self.initial)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_decl() -> FlowDecl {
        FlowDecl {
            states: vec!["A".into(), "B".into(), "C".into()],
            transitions: vec![
                ("A".into(), "B".into()),
                ("B".into(), "C".into()),
            ],
            initial: "A".into(),
        }
    }

    #[test]
    fn configure_replays_in_order() {
        let engine = FlowEngine::new("decl");
        sample_decl().configure(&engine).unwrap();

        assert_eq!(engine.states(), vec!["A", "B", "C"]);
        assert_eq!(engine.transitions().len(), 2);
        assert_eq!(engine.current_state().as_deref(), Some("A"));

        engine.move_to("B").unwrap();
        assert_eq!(engine.current_state().as_deref(), Some("B"));
    }

    #[test]
    fn configure_surfaces_builder_errors() {
        let engine = FlowEngine::new("decl");
        let mut decl = sample_decl();
        decl.transitions.push(("C".into(), "ghost".into()));

        assert!(matches!(
            decl.configure(&engine),
            Err(FlowError::NotInitialized)
        ));
    }

    #[test]
    fn configure_rejects_unknown_initial_state() {
        let engine = FlowEngine::new("decl");
        let mut decl = sample_decl();
        decl.initial = "ghost".into();

        match decl.configure(&engine) {
            Err(FlowError::InvalidState { name }) => assert_eq!(name, "ghost"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn decl_deserializes_from_json() {
        let json = r#"{
            "states": ["A", "B"],
            "transitions": [["A", "B"]],
            "initial": "A"
        }"#;
        let decl: FlowDecl = serde_json::from_str(json).unwrap();

        let engine = FlowEngine::new("decl");
        decl.configure(&engine).unwrap();
        assert_eq!(engine.current_state().as_deref(), Some("A"));
    }
}
