//! # Risk Scoring
//!
//! ```text
//! e     = clamp(emissions, 0, 1)              NaN -> 0
//! c     = min(compliance_flags / 5, 1)
//! s     = raised_signals / 4
//! total = 0.4*e + 0.3*c + 0.3*s
//! score = round(total * 1000) / 1000
//! ```
//!
//! The formula and its default constants must be reproduced exactly; scores
//! are compared across runs and against historical audits.

use serde::{Deserialize, Serialize};

use scaudit_core::{RiskScore, RiskSignals, Supplier, SIGNAL_KIND_COUNT};

/// Weights and normalizers for the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringWeights {
    /// Weight of the emissions component.
    pub emissions: f64,
    /// Weight of the compliance history component.
    pub compliance: f64,
    /// Weight of the signal component.
    pub signals: f64,
    /// Flag count at which the compliance component saturates.
    pub flag_normalizer: f64,
    /// Raised-signal count at which the signal component saturates.
    pub signal_normalizer: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            emissions: 0.4,
            compliance: 0.3,
            signals: 0.3,
            flag_normalizer: 5.0,
            signal_normalizer: SIGNAL_KIND_COUNT as f64,
        }
    }
}

impl ScoringWeights {
    /// Sum of the three component weights.
    pub fn total_weight(&self) -> f64 {
        self.emissions + self.compliance + self.signals
    }
}

/// Per-component values behind a score, each already normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub emissions: f64,
    pub compliance: f64,
    pub signals: f64,
    /// Weighted sum before rounding.
    pub raw_total: f64,
}

/// Stateless supplier risk scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskScorer {
    weights: ScoringWeights,
}

impl RiskScorer {
    /// A scorer using the given weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The weights in use.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a supplier. Pure and deterministic.
    pub fn score(&self, supplier: &Supplier, signals: &RiskSignals) -> RiskScore {
        self.score_parts(supplier.emissions, supplier.compliance_flags, signals.raised_count())
    }

    /// Score from raw components, for callers that have no `Supplier`.
    pub fn score_parts(&self, emissions: f64, compliance_flags: u32, raised_signals: usize) -> RiskScore {
        RiskScore::new(self.breakdown(emissions, compliance_flags, raised_signals).raw_total)
    }

    /// The normalized components and weighted total behind a score.
    pub fn breakdown(&self, emissions: f64, compliance_flags: u32, raised_signals: usize) -> ScoreBreakdown {
        let w = &self.weights;
        let emissions = if emissions.is_nan() {
            0.0
        } else {
            emissions.clamp(0.0, 1.0)
        };
        let compliance = (f64::from(compliance_flags) / w.flag_normalizer).min(1.0);
        let signals = (raised_signals as f64 / w.signal_normalizer).min(1.0);
        let raw_total = w.emissions * emissions + w.compliance * compliance + w.signals * signals;
        ScoreBreakdown {
            emissions,
            compliance,
            signals,
            raw_total,
        }
    }
}
