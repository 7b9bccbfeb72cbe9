//! Core value types for the flow engine.
//!
//! This module contains the plain-data layer of the machine:
//! - Directed [`Transition`] edges with canonical names
//! - The [`TransitionHistory`] undo stack
//! - The [`FlowError`] vocabulary shared by builder and transition calls
//!
//! Nothing in this module performs callback dispatch or locking; that
//! lives in [`crate::engine`].

mod error;
mod history;
mod transition;

pub use error::FlowError;
pub use history::{AppliedTransition, TransitionHistory};
pub use transition::Transition;
