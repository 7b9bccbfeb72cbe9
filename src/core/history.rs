//! Undo history for applied transitions.
//!
//! The history is a stack: every successful forward move pushes the
//! transition that was taken, every successful backward move pops it.
//! Records carry the time they were applied for diagnostics and for the
//! snapshot surface; equality-sensitive callers compare the inner
//! [`Transition`] only.

use super::transition::Transition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transition together with the instant it was applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppliedTransition {
    /// The edge that was taken.
    pub transition: Transition,
    /// When the forward move committed.
    pub applied_at: DateTime<Utc>,
}

impl AppliedTransition {
    /// Stamp a transition with the current time.
    pub fn now(transition: Transition) -> Self {
        Self {
            transition,
            applied_at: Utc::now(),
        }
    }
}

/// Stack of applied transitions, most recent on top.
///
/// # Example
///
/// ```rust
/// use flowstate::core::{Transition, TransitionHistory};
///
/// let mut history = TransitionHistory::new();
/// history.push(Transition::new("A", "B"));
/// history.push(Transition::new("B", "C"));
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.peek().unwrap().transition, Transition::new("B", "C"));
///
/// let undone = history.pop().unwrap();
/// assert_eq!(undone.transition.from(), "B");
/// assert_eq!(history.len(), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionHistory {
    entries: Vec<AppliedTransition>,
}

impl TransitionHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Push a freshly applied transition onto the stack.
    pub fn push(&mut self, transition: Transition) {
        self.entries.push(AppliedTransition::now(transition));
    }

    /// Pop the most recent record, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<AppliedTransition> {
        self.entries.pop()
    }

    /// The most recent record without removing it.
    pub fn peek(&self) -> Option<&AppliedTransition> {
        self.entries.last()
    }

    /// Number of records on the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records, oldest first (top of the stack is the last element).
    pub fn entries(&self) -> &[AppliedTransition] {
        &self.entries
    }

    /// The sequence of state names traversed so far.
    ///
    /// Returns the oldest record's `from`, then the `to` of every record
    /// in order. Empty when nothing has been applied.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.entries.first() {
            path.push(first.transition.from());
        }
        for entry in &self.entries {
            path.push(entry.transition.to());
        }
        path
    }
}
