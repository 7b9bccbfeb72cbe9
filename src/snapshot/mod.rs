//! Snapshot and rehydration surface for flow engines.
//!
//! A snapshot captures the persistable part of an engine: its state set,
//! transition set, current state, and undo history, keyed by the engine's
//! identifier. Callback providers and registered handler instances are
//! deliberately excluded; type identity and live instances cannot be
//! durably persisted, so rebinding after a restore is the caller's
//! responsibility.

use crate::core::{Transition, TransitionHistory};
use crate::engine::FlowEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable capture of one engine's persistable state.
///
/// # Example
///
/// ```rust
/// use flowstate::engine::FlowEngine;
/// use flowstate::snapshot::FlowSnapshot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = FlowEngine::new("wizard");
/// engine.add_state("start").add_state("end");
/// engine
///     .add_transition("start", "end")?
///     .set_initial_state("start")?;
/// engine.move_to("end")?;
///
/// let bytes = engine.snapshot().to_bytes()?;
///
/// let restored = FlowEngine::new("wizard");
/// restored.restore(FlowSnapshot::from_bytes(&bytes)?)?;
/// assert_eq!(restored.current_state().as_deref(), Some("end"));
/// assert_eq!(restored.history().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was captured
    pub created_at: DateTime<Utc>,

    /// Identifier of the engine this snapshot was taken from
    pub identifier: String,

    /// State names, in insertion order
    pub states: Vec<String>,

    /// Registered transitions, in insertion order
    pub transitions: Vec<Transition>,

    /// Current state, if an initial state had been set
    pub current_state: Option<String>,

    /// Undo history at capture time
    pub history: TransitionHistory,
}

impl FlowSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|err| SnapshotError::Serialization(err.to_string()))
    }

    /// Deserialize from JSON, validating the format version.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|err| SnapshotError::Deserialization(err.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Serialize to a compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|err| SnapshotError::Serialization(err.to_string()))
    }

    /// Deserialize from the binary form, validating the format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|err| SnapshotError::Deserialization(err.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    /// Check that the captured fields agree with each other.
    fn check_consistency(&self) -> Result<(), SnapshotError> {
        let known = |name: &str| self.states.iter().any(|s| s == name);

        if let Some(current) = &self.current_state {
            if !known(current) {
                return Err(SnapshotError::Corrupt(format!(
                    "current state '{current}' is not among the captured states"
                )));
            }
        }
        for transition in &self.transitions {
            if !known(transition.from()) || !known(transition.to()) {
                return Err(SnapshotError::Corrupt(format!(
                    "transition {transition} references a state not among the captured states"
                )));
            }
        }
        for entry in self.history.entries() {
            let transition = &entry.transition;
            if !known(transition.from()) || !known(transition.to()) {
                return Err(SnapshotError::Corrupt(format!(
                    "history entry {transition} references a state not among the captured states"
                )));
            }
        }
        Ok(())
    }
}

impl FlowEngine {
    /// Capture the engine's persistable state.
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            identifier: self.identifier().to_string(),
            states: self.states(),
            transitions: self.transitions(),
            current_state: self.current_state(),
            history: self.history(),
        }
    }

    /// Replace the engine's states, transitions, current state, and
    /// history with a snapshot's contents.
    ///
    /// The snapshot must carry a supported version and internally
    /// consistent fields. Callback providers and bound handlers are left
    /// untouched; rebinding is the caller's responsibility.
    pub fn restore(&self, snapshot: FlowSnapshot) -> Result<&Self, SnapshotError> {
        snapshot.check_version()?;
        snapshot.check_consistency()?;
        self.replace_configuration(
            snapshot.states,
            snapshot.transitions,
            snapshot.current_state,
            snapshot.history,
        );
        Ok(self)
    }
}
