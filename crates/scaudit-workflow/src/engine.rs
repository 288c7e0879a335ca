//! # Audit Engine
//!
//! Drives one audit run: suppliers are processed strictly in input order,
//! one at a time, each through the stage machine in [`crate::stage`].
//!
//! The only suspension point is a `HitlTriggered` supplier. The engine opens
//! the [`DecisionGate`] slot, publishes the pending decision and awaits the
//! slot's receiver. No other supplier step starts until the decision arrives
//! (or the run is cancelled). Snapshots contain finalized records only.
//!
//! Runs on the same engine are serialized by a run lock, so the single gate
//! slot is never contended by two runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use scaudit_core::{
    AuditRecord, AuditResultSet, DecisionToken, Disposition, LogEvent, RecordError, RunId,
    Supplier,
};
use scaudit_policy::{AuditConfig, PolicyEvaluator, RiskScorer};

use crate::events::{AuditEvent, EventSink};
use crate::gate::{DecisionGate, GateBusy, PendingDecision, SubmitOutcome};
use crate::providers::{GeneratedReport, ProviderError, ReportProvider, SignalProvider};
use crate::stage::{StageError, SupplierStage};

const ORCHESTRATOR: &str = "Orchestrator";
const SIGNAL_MONITOR: &str = "SignalMonitor";
const RISK_SCORER: &str = "RiskScorer";
const POLICY_EVALUATOR: &str = "PolicyEvaluator";
const REPORTER: &str = "Reporter";

// ── Errors ──────────────────────────────────────────────────────────

/// Conditions that end a run early.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A signal provider raised instead of degrading.
    #[error("signal retrieval failed for supplier {supplier_id}: {source}")]
    Signals {
        supplier_id: String,
        source: ProviderError,
    },

    /// The report provider raised instead of degrading.
    #[error("report generation failed: {0}")]
    Report(ProviderError),

    /// A pending decision was dropped without being resolved.
    #[error("decision {0} was abandoned before a reviewer answered")]
    DecisionAbandoned(DecisionToken),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    GateBusy(#[from] GateBusy),

    /// The driver task panicked or was aborted.
    #[error("audit task terminated abnormally: {0}")]
    Join(String),
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished run leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub status: RunStatus,
    /// Finalized records. Partial unless `status` is `Completed`.
    pub results: AuditResultSet,
    pub report: Option<GeneratedReport>,
    /// Failure reason for `Failed` runs.
    pub error: Option<String>,
}

impl AuditOutcome {
    pub fn run_id(&self) -> RunId {
        self.results.run_id
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

// ── Run handle ──────────────────────────────────────────────────────

/// Cloneable control surface of a running audit.
#[derive(Debug, Clone)]
pub struct RunControl {
    run_id: RunId,
    gate: DecisionGate,
    cancel: Arc<watch::Sender<bool>>,
}

impl RunControl {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The decision this run is waiting on, if any.
    pub fn pending(&self) -> Option<PendingDecision> {
        self.gate
            .pending()
            .filter(|p| p.token.run_id == self.run_id)
    }

    /// Resolve this run's pending decision.
    pub fn submit_decision(&self, approved: bool) -> SubmitOutcome {
        self.gate.submit_for_run(self.run_id, approved)
    }

    /// Resolve the pending decision bound to `token`.
    pub fn submit_decision_for(&self, token: &DecisionToken, approved: bool) -> SubmitOutcome {
        self.gate.submit_for(token, approved)
    }

    /// Ask the driver to stop before the next supplier. An open decision is
    /// discarded, not resolved.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// A spawned audit run.
#[derive(Debug)]
pub struct AuditRun {
    pub control: RunControl,
    pub events: tokio::sync::mpsc::UnboundedReceiver<AuditEvent>,
    pub join: JoinHandle<AuditOutcome>,
}

impl AuditRun {
    pub fn run_id(&self) -> RunId {
        self.control.run_id()
    }

    pub fn submit_decision(&self, approved: bool) -> SubmitOutcome {
        self.control.submit_decision(approved)
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Next event, `None` once the run has finished and the stream drained.
    pub async fn next_event(&mut self) -> Option<AuditEvent> {
        self.events.recv().await
    }

    /// Wait for the driver to finish.
    pub async fn outcome(self) -> Result<AuditOutcome, AuditError> {
        self.join.await.map_err(|e| AuditError::Join(e.to_string()))
    }
}

// ── Engine ──────────────────────────────────────────────────────────

/// The audit workflow engine.
#[derive(Clone)]
pub struct AuditEngine {
    signals: Arc<dyn SignalProvider>,
    reports: Arc<dyn ReportProvider>,
    scorer: RiskScorer,
    evaluator: PolicyEvaluator,
    gate: DecisionGate,
    run_lock: Arc<Mutex<()>>,
}

impl AuditEngine {
    /// An engine with the default scoring weights and thresholds.
    pub fn new(signals: Arc<dyn SignalProvider>, reports: Arc<dyn ReportProvider>) -> Self {
        Self {
            signals,
            reports,
            scorer: RiskScorer::default(),
            evaluator: PolicyEvaluator::default(),
            gate: DecisionGate::new(),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replace weights and thresholds.
    pub fn with_config(mut self, config: &AuditConfig) -> Self {
        self.scorer = config.scorer();
        self.evaluator = config.evaluator();
        self
    }

    pub fn gate(&self) -> &DecisionGate {
        &self.gate
    }

    /// The decision currently pending on this engine, if any.
    pub fn pending_decision(&self) -> Option<PendingDecision> {
        self.gate.pending()
    }

    /// Resolve the current pending decision. A no-op when none is pending.
    pub fn submit_decision(&self, approved: bool) -> SubmitOutcome {
        self.gate.submit(approved)
    }

    /// Resolve the pending decision bound to `token`. A stale or foreign
    /// token leaves the current slot untouched.
    pub fn submit_decision_for(&self, token: &DecisionToken, approved: bool) -> SubmitOutcome {
        self.gate.submit_for(token, approved)
    }

    /// Spawn a run on the current tokio runtime.
    pub fn start_audit(&self, company_id: impl Into<String>, suppliers: Vec<Supplier>) -> AuditRun {
        let run_id = RunId::new();
        let (sink, events) = EventSink::channel(run_id);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let engine = self.clone();
        let company_id = company_id.into();
        let join = tokio::spawn(async move {
            engine
                .drive(run_id, company_id, suppliers, sink, cancel_rx)
                .await
        });
        AuditRun {
            control: RunControl {
                run_id,
                gate: self.gate.clone(),
                cancel: Arc::new(cancel_tx),
            },
            events,
            join,
        }
    }

    /// Run an audit in place, emitting into `sink`. Not cancellable.
    pub async fn run(
        &self,
        company_id: impl Into<String>,
        suppliers: Vec<Supplier>,
        sink: EventSink,
    ) -> AuditOutcome {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.drive(sink.run_id(), company_id.into(), suppliers, sink, cancel_rx)
            .await
    }

    async fn drive(
        &self,
        run_id: RunId,
        company_id: String,
        suppliers: Vec<Supplier>,
        sink: EventSink,
        mut cancel: watch::Receiver<bool>,
    ) -> AuditOutcome {
        let _run = self.run_lock.lock().await;
        tracing::info!(run_id = %run_id, company_id = %company_id, suppliers = suppliers.len(), "audit started");
        sink.log(LogEvent::info(
            ORCHESTRATOR,
            format!("Starting audit for {company_id}..."),
        ));

        let mut results = AuditResultSet::new(run_id, company_id.clone());
        for supplier in &suppliers {
            if *cancel.borrow() {
                return finish(&sink, results, None, RunStatus::Cancelled, None);
            }
            match self.audit_supplier(run_id, supplier, &sink, &mut cancel).await {
                Ok(Some(record)) => {
                    results.records.push(record);
                    sink.emit(AuditEvent::Snapshot(results.clone()));
                }
                Ok(None) => return finish(&sink, results, None, RunStatus::Cancelled, None),
                Err(e) => return finish(&sink, results, None, RunStatus::Failed, Some(e)),
            }
        }

        if *cancel.borrow() {
            return finish(&sink, results, None, RunStatus::Cancelled, None);
        }
        sink.log(LogEvent::info(REPORTER, "Generating executive summary..."));
        let report = match self.reports.generate_report(&company_id, &results.records).await {
            Ok(report) => report,
            Err(e) => {
                return finish(&sink, results, None, RunStatus::Failed, Some(AuditError::Report(e)))
            }
        };
        if report.fallback {
            sink.log(LogEvent::warning(REPORTER, "Report generation degraded to fallback text."));
        } else {
            sink.log(LogEvent::success(REPORTER, "Report generated successfully."));
        }
        sink.emit(AuditEvent::Report(report.clone()));
        finish(&sink, results, Some(report), RunStatus::Completed, None)
    }

    /// One supplier through the pipeline. `Ok(None)` means the run was
    /// cancelled while waiting for a decision.
    async fn audit_supplier(
        &self,
        run_id: RunId,
        supplier: &Supplier,
        sink: &EventSink,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<Option<AuditRecord>, AuditError> {
        let mut stage = SupplierStage::Pending;
        sink.log(LogEvent::info(
            ORCHESTRATOR,
            format!("Processing {}...", supplier.name),
        ));

        sink.log(LogEvent::info(
            SIGNAL_MONITOR,
            format!("Scanning risk signals for {}...", supplier.name),
        ));
        let signals = self
            .signals
            .retrieve_signals(supplier)
            .await
            .map_err(|source| AuditError::Signals {
                supplier_id: supplier.id.to_string(),
                source,
            })?;
        stage = stage.advance(SupplierStage::SignalsGathered)?;
        if signals.has_findings() {
            sink.log(LogEvent::warning(
                SIGNAL_MONITOR,
                format!("Signals detected: {}", signals.findings.len()),
            ));
        }

        let score = self.scorer.score(supplier, &signals);
        stage = stage.advance(SupplierStage::Scored)?;
        sink.log(LogEvent::info(RISK_SCORER, format!("Computed risk score: {score}")));

        let disposition = self.evaluator.evaluate(score);
        stage = stage.advance(SupplierStage::PolicyEvaluated)?;
        let status = format!("Status: {disposition}");
        if disposition == Disposition::Approved {
            sink.log(LogEvent::success(POLICY_EVALUATOR, status));
        } else {
            sink.log(LogEvent::warning(POLICY_EVALUATOR, status));
        }
        tracing::debug!(
            run_id = %run_id,
            supplier_id = %supplier.id,
            score = %score,
            disposition = %disposition,
            "supplier evaluated"
        );

        let mut record = AuditRecord::new(supplier, signals, score, disposition);
        if record.is_awaiting_review() {
            stage = stage.advance(SupplierStage::AwaitingDecision)?;
            sink.log(LogEvent::error(
                ORCHESTRATOR,
                "HITL triggered. Pausing workflow for reviewer input.",
            ));
            let (pending, decision) = self.gate.open(run_id, record.clone())?;
            let token = pending.token;
            // Dropping this step (aborted task, dropped future) must not leave the slot behind.
            let _slot = SlotGuard {
                gate: &self.gate,
                token,
            };
            sink.emit(AuditEvent::AwaitingDecision(pending));

            let approved = tokio::select! {
                biased;
                received = decision => match received {
                    Ok(approved) => approved,
                    Err(_) => return Err(AuditError::DecisionAbandoned(token)),
                },
                _ = cancelled(cancel) => return Ok(None),
            };

            let resolved = record.resolve_hitl(approved)?;
            if approved {
                sink.log(LogEvent::success(
                    ORCHESTRATOR,
                    "Reviewer overrode HITL. Supplier approved.",
                ));
            } else {
                sink.log(LogEvent::error(ORCHESTRATOR, "Reviewer confirmed rejection."));
            }
            metrics::counter!(
                "scaudit_hitl_decisions_total",
                "outcome" => if approved { "approved" } else { "rejected" }
            )
            .increment(1);
            sink.emit(AuditEvent::DecisionResolved {
                token,
                supplier_id: record.supplier_id.clone(),
                disposition: resolved,
            });
        }

        stage.advance(SupplierStage::Finalized)?;
        metrics::counter!(
            "scaudit_suppliers_audited_total",
            "disposition" => record.disposition().as_str()
        )
        .increment(1);
        Ok(Some(record))
    }
}

impl std::fmt::Debug for AuditEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditEngine")
            .field("scorer", &self.scorer)
            .field("evaluator", &self.evaluator)
            .field("gate", &self.gate)
            .finish()
    }
}

/// Discards the decision slot bound to `token` when dropped. A no-op once
/// the slot has been resolved.
struct SlotGuard<'a> {
    gate: &'a DecisionGate,
    token: DecisionToken,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.gate.discard(&self.token) {
            tracing::debug!(token = %self.token, "decision slot discarded");
        }
    }
}

/// Emit the closing log lines and build the outcome.
fn finish(
    sink: &EventSink,
    results: AuditResultSet,
    report: Option<GeneratedReport>,
    status: RunStatus,
    error: Option<AuditError>,
) -> AuditOutcome {
    let run_id = results.run_id;
    let error = error.map(|e| e.to_string());
    match status {
        RunStatus::Completed => sink.log(LogEvent::success(ORCHESTRATOR, "Workflow complete.")),
        RunStatus::Cancelled => sink.log(LogEvent::error(ORCHESTRATOR, "Workflow cancelled.")),
        RunStatus::Failed => sink.log(LogEvent::error(
            ORCHESTRATOR,
            format!("Workflow failed: {}", error.as_deref().unwrap_or("unknown error")),
        )),
    }
    metrics::counter!("scaudit_runs_total", "status" => status.as_str()).increment(1);
    tracing::info!(run_id = %run_id, status = %status, records = results.len(), "audit finished");
    sink.emit(AuditEvent::Finished { run_id, status });
    AuditOutcome {
        status,
        results,
        report,
        error,
    }
}

/// Resolves once cancellation is requested. Never resolves if the sender
/// is dropped without cancelling.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_names() {
        assert_eq!(RunStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(serde_json::to_string(&RunStatus::Failed).unwrap(), "\"failed\"");
    }

    #[tokio::test]
    async fn cancelled_resolves_after_send() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { cancelled(&mut rx).await });
        tx.send_replace(true);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_stays_pending_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), cancelled(&mut rx)).await;
        assert!(timed_out.is_err());
    }

    #[test]
    fn audit_error_display() {
        let e = AuditError::Signals {
            supplier_id: "sup-1".into(),
            source: ProviderError::Transport("connection reset".into()),
        };
        assert_eq!(
            e.to_string(),
            "signal retrieval failed for supplier sup-1: transport error: connection reset"
        );
    }
}
