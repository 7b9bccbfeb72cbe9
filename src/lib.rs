//! Flowstate: a registry of named finite state machines.
//!
//! Each machine is built by declaring states and directed transitions,
//! tracks a current state and an undoable transition history, and
//! dispatches caller-supplied on-enter/on-exit callbacks as it moves
//! between states.
//!
//! # Core Concepts
//!
//! - **Registry**: [`FlowRegistry`] maps opaque identifiers to engines,
//!   creating each lazily on first lookup
//! - **Builder**: states, then transitions, then the initial state, then
//!   callback providers; preconditions are checked at every step
//! - **History**: every forward move is recorded and can be undone with
//!   [`FlowEngine::move_to_previous`], which dispatches callbacks with
//!   inverted enter/exit roles
//! - **Callbacks**: provider types declare hooks statically via
//!   [`FlowCallbacks`]; live handlers attach and detach at runtime
//!   through `register`/`unregister`
//!
//! # Example
//!
//! ```rust
//! use flowstate::{FlowCallbacks, CallbackTable, FlowRegistry, ProviderSpec};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct ShipmentLog {
//!     packed: usize,
//! }
//!
//! impl FlowCallbacks for ShipmentLog {
//!     fn callbacks() -> CallbackTable<Self> {
//!         CallbackTable::new().on_enter("packed", |log| log.packed += 1)
//!     }
//! }
//!
//! # fn main() -> Result<(), flowstate::FlowError> {
//! let registry = FlowRegistry::new();
//! let flow = registry.get_or_create("shipment");
//!
//! flow.add_state("open").add_state("packed").add_state("shipped");
//! flow.add_transition("open", "packed")?
//!     .add_transition("packed", "shipped")?
//!     .set_initial_state("open")?
//!     .set_callback_providers(vec![ProviderSpec::of::<ShipmentLog>()])?;
//!
//! let log = Arc::new(Mutex::new(ShipmentLog::default()));
//! flow.register(&log);
//!
//! flow.move_to("packed")?;
//! assert_eq!(log.lock().packed, 1);
//!
//! flow.move_to_previous()?;
//! assert_eq!(flow.current_state().as_deref(), Some("open"));
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod core;
pub mod decl;
pub mod engine;
pub mod registry;
pub mod snapshot;

// Re-export commonly used types
pub use crate::callbacks::{
    CallbackBinding, CallbackTable, FlowCallbacks, ProviderSpec, ProviderToken,
};
pub use crate::core::{AppliedTransition, FlowError, Transition, TransitionHistory};
pub use crate::decl::FlowDecl;
pub use crate::engine::FlowEngine;
pub use crate::registry::FlowRegistry;
pub use crate::snapshot::{FlowSnapshot, SnapshotError};
