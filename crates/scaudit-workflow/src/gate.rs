//! # Decision Gate
//!
//! The single-slot rendezvous between a suspended supplier step and the
//! external reviewer.
//!
//! The engine opens a slot when a supplier resolves to `HitlTriggered` and
//! awaits the paired `oneshot::Receiver`. A reviewer resolves the slot with
//! [`DecisionGate::submit`] (whatever is pending) or
//! [`DecisionGate::submit_for`] (only the slot bound to a given token).
//!
//! ## Invariants
//!
//! - At most one slot exists at a time. Opening a second one fails unless
//!   the first slot's waiter is gone, in which case the new slot replaces it.
//! - The slot's sender is moved out under the lock before it fires, so it
//!   is consumed at most once. Concurrent submissions are serialized by the
//!   mutex and only the first one resolves.
//! - A token that does not match the open slot leaves the slot untouched.
//! - A discarded slot is never resolved; its receiver observes a closed
//!   channel.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;

use scaudit_core::{AuditRecord, DecisionToken, RunId, Timestamp};
use scaudit_policy::HITL_EXPLANATION;

/// A record waiting for a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDecision {
    /// Token that must accompany a targeted resolution.
    pub token: DecisionToken,
    /// The record under review. Its disposition is `HitlTriggered`.
    pub record: AuditRecord,
    /// Why review is required.
    pub explanation: String,
    /// When the slot was opened.
    pub opened_at: Timestamp,
}

impl PendingDecision {
    /// The reviewer-facing summary of this decision.
    pub fn view(&self) -> DecisionView {
        DecisionView::from(self)
    }
}

/// What a reviewer is shown before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionView {
    pub token: DecisionToken,
    pub supplier_name: String,
    /// Score with three decimals.
    pub score: String,
    /// Emissions with two decimals.
    pub emissions: String,
    pub findings: Vec<String>,
    pub explanation: String,
}

impl From<&PendingDecision> for DecisionView {
    fn from(p: &PendingDecision) -> Self {
        Self {
            token: p.token,
            supplier_name: p.record.supplier_name.clone(),
            score: format!("{:.3}", p.record.score.value()),
            emissions: format!("{:.2}", p.record.emissions),
            findings: p.record.signals.findings.clone(),
            explanation: p.explanation.clone(),
        }
    }
}

impl std::fmt::Display for DecisionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Supplier:  {}", self.supplier_name)?;
        writeln!(f, "Score:     {}", self.score)?;
        writeln!(f, "Emissions: {}", self.emissions)?;
        for finding in &self.findings {
            writeln!(f, "  - {finding}")?;
        }
        write!(f, "{}", self.explanation)
    }
}

/// Result of a decision submission. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The pending decision was resolved by this call.
    Resolved,
    /// Nothing was pending; the call had no effect.
    NoPendingDecision,
    /// The token did not match the open slot; the slot is untouched.
    StaleToken,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::NoPendingDecision => "no_pending_decision",
            Self::StaleToken => "stale_token",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot was opened while another was still pending.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("a decision is already pending under {0}")]
pub struct GateBusy(pub DecisionToken);

struct Slot {
    pending: PendingDecision,
    sender: oneshot::Sender<bool>,
}

#[derive(Default)]
struct GateState {
    slot: Option<Slot>,
    next_sequence: u64,
}

/// Shared single-slot decision gate. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct DecisionGate {
    inner: Arc<Mutex<GateState>>,
}

impl DecisionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the slot for `record` and return the pending decision with the
    /// receiver the caller must await.
    pub fn open(
        &self,
        run_id: RunId,
        record: AuditRecord,
    ) -> Result<(PendingDecision, oneshot::Receiver<bool>), GateBusy> {
        let mut state = self.inner.lock();
        if let Some(slot) = &state.slot {
            if !slot.sender.is_closed() {
                return Err(GateBusy(slot.pending.token));
            }
            tracing::warn!(token = %slot.pending.token, "replacing abandoned decision slot");
        }
        let token = DecisionToken::issue(run_id, state.next_sequence);
        state.next_sequence += 1;
        let (sender, receiver) = oneshot::channel();
        let pending = PendingDecision {
            token,
            record,
            explanation: HITL_EXPLANATION.to_string(),
            opened_at: Timestamp::now(),
        };
        state.slot = Some(Slot {
            pending: pending.clone(),
            sender,
        });
        Ok((pending, receiver))
    }

    /// The decision currently pending, if any.
    pub fn pending(&self) -> Option<PendingDecision> {
        self.inner.lock().slot.as_ref().map(|s| s.pending.clone())
    }

    /// Whether a decision is pending.
    pub fn is_pending(&self) -> bool {
        self.inner.lock().slot.is_some()
    }

    /// Resolve whatever decision is pending.
    pub fn submit(&self, approved: bool) -> SubmitOutcome {
        let slot = self.inner.lock().slot.take();
        Self::fire(slot, approved)
    }

    /// Resolve the pending decision only if it is bound to `token`.
    pub fn submit_for(&self, token: &DecisionToken, approved: bool) -> SubmitOutcome {
        self.take_if(approved, |open| open == *token)
    }

    /// Resolve the pending decision only if it belongs to `run_id`.
    pub fn submit_for_run(&self, run_id: RunId, approved: bool) -> SubmitOutcome {
        self.take_if(approved, |open| open.run_id == run_id)
    }

    /// Drop the slot bound to `token` without resolving it.
    pub fn discard(&self, token: &DecisionToken) -> bool {
        let mut state = self.inner.lock();
        if state.slot.as_ref().is_some_and(|s| s.pending.token == *token) {
            state.slot = None;
            true
        } else {
            false
        }
    }

    fn take_if(&self, approved: bool, matches: impl FnOnce(DecisionToken) -> bool) -> SubmitOutcome {
        let slot = {
            let mut state = self.inner.lock();
            let Some(open) = state.slot.as_ref().map(|s| s.pending.token) else {
                return SubmitOutcome::NoPendingDecision;
            };
            if !matches(open) {
                return SubmitOutcome::StaleToken;
            }
            state.slot.take()
        };
        Self::fire(slot, approved)
    }

    fn fire(slot: Option<Slot>, approved: bool) -> SubmitOutcome {
        let Some(slot) = slot else {
            return SubmitOutcome::NoPendingDecision;
        };
        let token = slot.pending.token;
        match slot.sender.send(approved) {
            Ok(()) => {
                tracing::debug!(token = %token, approved, "decision delivered");
                SubmitOutcome::Resolved
            }
            // The waiting step went away (run aborted) before the decision.
            Err(_) => SubmitOutcome::NoPendingDecision,
        }
    }
}

impl std::fmt::Debug for DecisionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("DecisionGate")
            .field("pending", &state.slot.as_ref().map(|s| s.pending.token))
            .field("next_sequence", &state.next_sequence)
            .finish()
    }
}
