//! # Audit Records
//!
//! An [`AuditRecord`] is created when a supplier finishes policy
//! evaluation. Its disposition may change exactly once more, when a
//! reviewer resolves a `HitlTriggered` record, and is immutable after that.
//! The disposition field is private so that [`AuditRecord::resolve_hitl`]
//! is the only mutation path.

use serde::{Deserialize, Serialize};

use crate::disposition::Disposition;
use crate::error::RecordError;
use crate::identity::{RunId, SupplierId};
use crate::score::RiskScore;
use crate::signals::RiskSignals;
use crate::supplier::Supplier;
use crate::temporal::Timestamp;

/// The audit outcome for one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Supplier identity.
    pub supplier_id: SupplierId,
    /// Supplier display name.
    pub supplier_name: String,
    /// Signals gathered for the supplier.
    pub signals: RiskSignals,
    /// Emissions value carried through unchanged from the supplier.
    pub emissions: f64,
    /// Computed risk score.
    pub score: RiskScore,
    disposition: Disposition,
    /// Reviewer decision, present only on resolved HITL records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    human_decision: Option<bool>,
    /// When the record was created.
    pub audited_at: Timestamp,
}

impl AuditRecord {
    /// Build the record for a supplier that has just been evaluated.
    pub fn new(
        supplier: &Supplier,
        signals: RiskSignals,
        score: RiskScore,
        disposition: Disposition,
    ) -> Self {
        Self {
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            signals,
            emissions: supplier.emissions,
            score,
            disposition,
            human_decision: None,
            audited_at: Timestamp::now(),
        }
    }

    /// The current disposition.
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// The reviewer's decision, if this record went through human review.
    pub fn human_decision(&self) -> Option<bool> {
        self.human_decision
    }

    /// Whether the record is still waiting for a reviewer.
    pub fn is_awaiting_review(&self) -> bool {
        self.disposition.requires_human_review()
    }

    /// Apply a reviewer decision to a `HitlTriggered` record.
    ///
    /// `approved == true` overrides to `Approved`; `false` confirms
    /// `Rejected`. Any other starting disposition is rejected, which also
    /// makes a second resolution impossible.
    pub fn resolve_hitl(&mut self, approved: bool) -> Result<Disposition, RecordError> {
        if !self.is_awaiting_review() {
            return Err(RecordError::NotAwaitingReview {
                supplier_id: self.supplier_id.to_string(),
                disposition: self.disposition,
            });
        }
        self.disposition = if approved {
            Disposition::Approved
        } else {
            Disposition::Rejected
        };
        self.human_decision = Some(approved);
        Ok(self.disposition)
    }
}

/// Per-disposition counts over a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DispositionSummary {
    pub approved: usize,
    pub review: usize,
    pub hitl_triggered: usize,
    pub rejected: usize,
    /// Arithmetic mean of the scores, `None` for an empty set.
    pub mean_score: Option<f64>,
}

impl DispositionSummary {
    /// Total number of records counted.
    pub fn total(&self) -> usize {
        self.approved + self.review + self.hitl_triggered + self.rejected
    }
}

/// The ordered, finalized records of one audit run.
///
/// Published as an incremental snapshot after each supplier completes and
/// as the final result at the end of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResultSet {
    /// The run that produced these records.
    pub run_id: RunId,
    /// Company under audit.
    pub company_id: String,
    /// Finalized records in supplier input order.
    pub records: Vec<AuditRecord>,
}

impl AuditResultSet {
    /// An empty result set for a new run.
    pub fn new(run_id: RunId, company_id: impl Into<String>) -> Self {
        Self {
            run_id,
            company_id: company_id.into(),
            records: Vec::new(),
        }
    }

    /// Number of finalized records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been finalized yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counts per disposition plus the mean score.
    pub fn summary(&self) -> DispositionSummary {
        let mut summary = DispositionSummary::default();
        for record in &self.records {
            match record.disposition() {
                Disposition::Approved => summary.approved += 1,
                Disposition::Review => summary.review += 1,
                Disposition::HitlTriggered => summary.hitl_triggered += 1,
                Disposition::Rejected => summary.rejected += 1,
            }
        }
        if !self.records.is_empty() {
            let total: f64 = self.records.iter().map(|r| r.score.value()).sum();
            summary.mean_score = Some(total / self.records.len() as f64);
        }
        summary
    }
}
