//! Engine errors.

use super::transition::Transition;
use thiserror::Error;

/// Errors surfaced by builder and transition operations.
///
/// All variants are recoverable and returned synchronously from the call
/// that detected them. Duplicate state or transition additions are not
/// errors; they are logged no-ops.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A transition-affecting operation ran before states, transitions,
    /// and a current state were all established.
    #[error("Flow is not initialized: states, transitions, and an initial state are required")]
    NotInitialized,

    /// An operation referenced a state name the machine does not know.
    #[error("Unknown state '{name}'")]
    InvalidState {
        /// The state name that was not found.
        name: String,
    },

    /// A state change was requested that no registered transition allows
    /// from the current state.
    ///
    /// `attempted` carries the mismatched transition when one was found by
    /// name, or a synthesized `(current, target)` pair for derived-name
    /// lookups. It is diagnostic data only and never corresponds to a
    /// registered edge in the latter case.
    #[error("{}", invalid_transition_message(current, attempted.as_ref()))]
    InvalidTransition {
        /// The machine's current state when the request was rejected.
        current: String,
        /// The offending or attempted transition, where available.
        attempted: Option<Transition>,
    },

    /// An undo was requested with an empty history stack.
    #[error("Flow has no history to move back to")]
    NoHistory,
}

fn invalid_transition_message(current: &str, attempted: Option<&Transition>) -> String {
    match attempted {
        Some(transition) => {
            format!("Transition not allowed: {transition} from current state '{current}'")
        }
        None => format!("Transition not found, current state '{current}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_the_edge() {
        let err = FlowError::InvalidTransition {
            current: "A".to_string(),
            attempted: Some(Transition::new("B", "B")),
        };
        assert_eq!(
            err.to_string(),
            "Transition not allowed: B -> B from current state 'A'"
        );
    }

    #[test]
    fn invalid_transition_message_without_edge() {
        let err = FlowError::InvalidTransition {
            current: "A".to_string(),
            attempted: None,
        };
        assert_eq!(err.to_string(), "Transition not found, current state 'A'");
    }
}
