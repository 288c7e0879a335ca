//! # Supplier Pipeline Stages
//!
//! ```text
//! Pending -> SignalsGathered -> Scored -> PolicyEvaluated -> Finalized
//!                                              |                ^
//!                                              v                |
//!                                       AwaitingDecision -------+
//! ```
//!
//! `AwaitingDecision` is entered only when the disposition is
//! `HitlTriggered` and is the only stage in which the engine blocks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage of one supplier within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStage {
    Pending,
    SignalsGathered,
    Scored,
    PolicyEvaluated,
    AwaitingDecision,
    /// Terminal.
    Finalized,
}

/// Attempted transition outside the stage graph.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid supplier stage transition from {from} to {to}")]
pub struct StageError {
    pub from: SupplierStage,
    pub to: SupplierStage,
}

impl SupplierStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SignalsGathered => "signals_gathered",
            Self::Scored => "scored",
            Self::PolicyEvaluated => "policy_evaluated",
            Self::AwaitingDecision => "awaiting_decision",
            Self::Finalized => "finalized",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Stages reachable in one step.
    pub fn valid_transitions(&self) -> &'static [SupplierStage] {
        match self {
            Self::Pending => &[Self::SignalsGathered],
            Self::SignalsGathered => &[Self::Scored],
            Self::Scored => &[Self::PolicyEvaluated],
            Self::PolicyEvaluated => &[Self::Finalized, Self::AwaitingDecision],
            Self::AwaitingDecision => &[Self::Finalized],
            Self::Finalized => &[],
        }
    }

    /// Move to `to`, or fail if the edge does not exist.
    pub fn advance(self, to: SupplierStage) -> Result<SupplierStage, StageError> {
        if self.valid_transitions().contains(&to) {
            Ok(to)
        } else {
            Err(StageError { from: self, to })
        }
    }
}

impl std::fmt::Display for SupplierStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
