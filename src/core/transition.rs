//! Directed transitions between named states.
//!
//! A transition is an immutable value naming an edge in the machine's
//! graph. The same value doubles as the record type pushed onto the
//! undo history when the edge is taken.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed edge between two states, identified by its endpoints.
///
/// Two transitions are equal iff both endpoints match; any metadata a
/// caller attaches elsewhere does not participate in equality. The
/// canonical name is derived from the endpoints and can be used for
/// name-based application via [`FlowEngine::apply_transition`].
///
/// [`FlowEngine::apply_transition`]: crate::engine::FlowEngine::apply_transition
///
/// # Example
///
/// ```rust
/// use flowstate::core::Transition;
///
/// let transition = Transition::new("draft", "review");
/// assert_eq!(transition.name(), "draft_review");
/// assert_eq!(transition, Transition::new("draft", "review"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    from: String,
    to: String,
}

impl Transition {
    /// Create a transition from `from` to `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The state this transition leaves.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The state this transition enters.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Canonical name, `<from>_<to>`.
    ///
    /// Deterministic, so external callers can compute it without holding
    /// a `Transition` value.
    pub fn name(&self) -> String {
        format!("{}_{}", self.from, self.to)
    }

    /// Whether this transition loops back to its own source state.
    pub fn is_self_transition(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_derived_from_endpoints() {
        let transition = Transition::new("A", "B");
        assert_eq!(transition.name(), "A_B");
        assert_eq!(transition.from(), "A");
        assert_eq!(transition.to(), "B");
    }

    #[test]
    fn equality_depends_only_on_endpoints() {
        assert_eq!(Transition::new("A", "B"), Transition::new("A", "B"));
        assert_ne!(Transition::new("A", "B"), Transition::new("B", "A"));
        assert_ne!(Transition::new("A", "B"), Transition::new("A", "C"));
    }

    #[test]
    fn self_transition_is_detected() {
        assert!(Transition::new("B", "B").is_self_transition());
        assert!(!Transition::new("A", "B").is_self_transition());
    }

    #[test]
    fn display_renders_endpoints() {
        let transition = Transition::new("A", "B");
        assert_eq!(transition.to_string(), "A -> B");
    }

    #[test]
    fn transition_serializes_correctly() {
        let transition = Transition::new("A", "B");
        let json = serde_json::to_string(&transition).unwrap();
        let deserialized: Transition = serde_json::from_str(&json).unwrap();
        assert_eq!(transition, deserialized);
    }
}
