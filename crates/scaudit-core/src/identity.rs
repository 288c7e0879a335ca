//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers used across an audit run. These
//! prevent accidental identifier confusion. A `RunId` cannot be passed
//! where a `SupplierId` is expected, and a `DecisionToken` is only ever
//! minted by the decision gate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Identifier of a discovered supplier.
///
/// Supplier ids come from the discovery provider and are opaque strings
/// (`"sup-0-1718000000000"`, `"1"`, ...). Only emptiness is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(String);

impl SupplierId {
    /// Create a supplier id, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "supplier_id" });
        }
        Ok(Self(id))
    }

    /// Id assigned to the supplier at `index` of a discovery batch.
    ///
    /// Format: `sup-<index>-<epoch millis>`.
    pub fn indexed(index: usize, epoch_millis: i64) -> Self {
        Self(format!("sup-{index}-{epoch_millis}"))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of one audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new random run identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run:{}", self.0)
    }
}

/// Token binding a decision to exactly one pending-decision slot.
///
/// Issued when the slot is opened. `sequence` counts slots opened within the
/// run, and `nonce` makes tokens unguessable across runs. Two tokens are
/// equal only if all three components match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionToken {
    /// The run that opened the slot.
    pub run_id: RunId,
    /// Position of the slot among all slots opened by this run (0-based).
    pub sequence: u64,
    /// Random component.
    pub nonce: Uuid,
}

impl DecisionToken {
    /// Mint a fresh token for the given run and sequence number.
    pub fn issue(run_id: RunId, sequence: u64) -> Self {
        Self {
            run_id,
            sequence,
            nonce: Uuid::new_v4(),
        }
    }
}

impl std::fmt::Display for DecisionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decision:{}:{}:{}", self.run_id.0, self.sequence, self.nonce)
    }
}
