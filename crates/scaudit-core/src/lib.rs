//! # scaudit-core — Foundational Types for the Audit Stack
//!
//! Every other crate in the workspace depends on `scaudit-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `SupplierId`, `RunId` and
//!    `DecisionToken` are distinct types. A decision token from one run
//!    cannot be passed where a supplier id is expected.
//!
//! 2. **`RiskScore` is always normalized.** The only constructor clamps to
//!    `[0, 1]` and rounds to three decimals, so every score observed
//!    anywhere in the system satisfies the score invariant by construction.
//!
//! 3. **Single `Disposition` enum.** `Rejected` exists in the enum but is only
//!    reachable through [`AuditRecord::resolve_hitl`].
//!
//! 4. **UTC-only timestamps.** `Timestamp` wraps `DateTime<Utc>` with
//!    millisecond precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `scaudit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod disposition;
pub mod error;
pub mod identity;
pub mod log;
pub mod record;
pub mod score;
pub mod signals;
pub mod supplier;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use disposition::Disposition;
pub use error::{RecordError, ValidationError};
pub use identity::{DecisionToken, RunId, SupplierId};
pub use log::{LogEvent, Severity};
pub use record::{AuditRecord, AuditResultSet, DispositionSummary};
pub use score::RiskScore;
pub use signals::{RiskSignals, SignalKind, SIGNAL_KIND_COUNT};
pub use supplier::Supplier;
pub use temporal::Timestamp;
