//! # scaudit-policy — Risk Scoring and Policy Evaluation
//!
//! The two pure functions at the heart of an audit:
//!
//! - **[`RiskScorer`]** maps a supplier's emissions, compliance history and
//!   risk signals to a [`RiskScore`](scaudit_core::RiskScore).
//! - **[`PolicyEvaluator`]** maps a score to a
//!   [`Disposition`](scaudit_core::Disposition).
//!
//! Both are total. Out-of-range and non-finite inputs are clamped or routed
//! to the safest outcome, never rejected.
//!
//! Weights, normalizers and thresholds default to the fixed policy values
//! (0.4 / 0.3 / 0.3, 5 flags, 4 signals, 0.5 / 0.8) and may be overridden
//! through [`AuditConfig`], typically loaded from YAML.
//!
//! ## Crate Policy
//!
//! - Depends only on `scaudit-core` internally.
//! - No I/O outside [`config`].
//! - No `.unwrap()` outside tests.

pub mod config;
pub mod policy;
pub mod scoring;

pub use config::{AuditConfig, ConfigError};
pub use policy::{PolicyEvaluator, PolicyThresholds, HITL_EXPLANATION};
pub use scoring::{RiskScorer, ScoreBreakdown, ScoringWeights};
