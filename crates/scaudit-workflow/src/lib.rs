//! # scaudit-workflow — Sequential Audit Engine with Human Review
//!
//! Runs the per-supplier pipeline
//!
//! ```text
//! signals -> score -> policy -> [await reviewer] -> finalize
//! ```
//!
//! over a batch of suppliers, strictly sequentially, and publishes progress
//! as an ordered [`AuditEvent`] stream.
//!
//! ## Components
//!
//! - **Engine** (`engine.rs`): [`AuditEngine`] owns the scorer, evaluator,
//!   injected providers and the decision gate. [`AuditEngine::start_audit`]
//!   spawns a run and returns an [`AuditRun`] handle.
//!
//! - **Gate** (`gate.rs`): [`DecisionGate`] holds at most one pending
//!   decision. Each slot is bound to a [`DecisionToken`](scaudit_core::DecisionToken)
//!   and fires a `oneshot` exactly once.
//!
//! - **Stages** (`stage.rs`): [`SupplierStage`] with runtime-checked
//!   transitions.
//!
//! - **Events** (`events.rs`): [`AuditEvent`] and the [`EventSink`] the
//!   engine writes to.
//!
//! - **Providers** (`providers.rs`): the async collaborator traits for
//!   discovery, signals and reports.
//!
//! ## Crate Policy
//!
//! - No I/O of its own. All external data arrives through provider traits.
//! - No polling. Suspension is an await on a oneshot receiver.
//! - No `.unwrap()` outside tests.

pub mod engine;
pub mod events;
pub mod gate;
pub mod providers;
pub mod stage;

pub use engine::{AuditEngine, AuditError, AuditOutcome, AuditRun, RunControl, RunStatus};
pub use events::{AuditEvent, EventSink};
pub use gate::{DecisionGate, DecisionView, GateBusy, PendingDecision, SubmitOutcome};
pub use providers::{
    report_rows, DiscoveryProvider, GeneratedReport, ProviderError, ReportProvider, ReportRow,
    SignalProvider, REPORT_FALLBACK_TEXT,
};
pub use stage::{StageError, SupplierStage};
