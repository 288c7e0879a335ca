//! # Score Subcommand
//!
//! Scores a single supplier from raw inputs and reports the disposition the
//! policy would assign, without running a workflow.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use scaudit_core::{Disposition, RiskScore, RiskSignals, SignalKind};
use scaudit_policy::{AuditConfig, ScoreBreakdown};

/// Arguments for the `scaudit score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Estimated emissions intensity in [0, 1].
    #[arg(long)]
    pub emissions: f64,

    /// Number of prior compliance flags.
    #[arg(long, default_value_t = 0)]
    pub flags: u32,

    /// A raised risk signal. Repeatable: adverse_media, regulatory_action,
    /// safety_violation, esg_controversy.
    #[arg(long = "signal", value_name = "SIGNAL")]
    pub signals: Vec<SignalKind>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Result of scoring one supplier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub score: RiskScore,
    pub disposition: Disposition,
    pub requires_human_review: bool,
    pub raised_signals: Vec<SignalKind>,
    pub emissions_component: f64,
    pub compliance_component: f64,
    pub signals_component: f64,
}

/// Score `args` under `config`. Repeated signals count once.
pub fn evaluate(args: &ScoreArgs, config: &AuditConfig) -> ScoreReport {
    let signals = args
        .signals
        .iter()
        .fold(RiskSignals::clear(), |acc, kind| acc.with_signal(*kind));
    let scorer = config.scorer();
    let ScoreBreakdown {
        emissions,
        compliance,
        signals: signals_component,
        ..
    } = scorer.breakdown(args.emissions, args.flags, signals.raised_count());
    let score = scorer.score_parts(args.emissions, args.flags, signals.raised_count());
    let disposition = config.evaluator().evaluate(score);

    ScoreReport {
        score,
        disposition,
        requires_human_review: disposition.requires_human_review(),
        raised_signals: signals.raised(),
        emissions_component: emissions,
        compliance_component: compliance,
        signals_component,
    }
}

/// Execute the score subcommand.
pub fn run_score(args: &ScoreArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_audit_config(config_path)?;
    let report = evaluate(args, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Score:       {}", report.score);
        println!("Disposition: {}", report.disposition);
        println!(
            "Components:  emissions {:.3}, compliance {:.3}, signals {:.3}",
            report.emissions_component, report.compliance_component, report.signals_component
        );
        if report.requires_human_review {
            println!("{}", scaudit_policy::HITL_EXPLANATION);
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(emissions: f64, flags: u32, signals: &[SignalKind]) -> ScoreArgs {
        ScoreArgs {
            emissions,
            flags,
            signals: signals.to_vec(),
            json: false,
        }
    }

    #[test]
    fn reference_supplier_lands_in_review() {
        let report = evaluate(
            &args(0.8, 2, &[SignalKind::AdverseMedia]),
            &AuditConfig::default(),
        );
        assert_eq!(report.score.to_string(), "0.515");
        assert_eq!(report.disposition, Disposition::Review);
        assert!(!report.requires_human_review);
    }

    #[test]
    fn worst_case_requires_review() {
        let report = evaluate(&args(1.0, 5, &SignalKind::ALL), &AuditConfig::default());
        assert_eq!(report.score.value(), 1.0);
        assert_eq!(report.disposition, Disposition::HitlTriggered);
        assert!(report.requires_human_review);
    }

    #[test]
    fn repeated_signal_counts_once() {
        let once = evaluate(&args(0.5, 1, &[SignalKind::SafetyViolation]), &AuditConfig::default());
        let twice = evaluate(
            &args(0.5, 1, &[SignalKind::SafetyViolation, SignalKind::SafetyViolation]),
            &AuditConfig::default(),
        );
        assert_eq!(once, twice);
    }
}
