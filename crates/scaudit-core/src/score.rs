//! # Risk Score
//!
//! `RiskScore` is the normalized output of the scorer. Every instance,
//! including deserialized ones, holds a finite value in `[0, 1]` with at
//! most three decimals. The single constructor enforces it.

use serde::{Deserialize, Serialize};

/// Decimal places retained by every score.
pub const SCORE_DECIMALS: u32 = 3;

const SCALE: f64 = 1_000.0;

/// A risk score in `[0, 1]`, rounded to three decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct RiskScore(f64);

impl RiskScore {
    /// The lowest possible score.
    pub const MIN: RiskScore = RiskScore(0.0);
    /// The highest possible score.
    pub const MAX: RiskScore = RiskScore(1.0);

    /// Normalize a raw value: clamp to `[0, 1]`, then round half away from
    /// zero to three decimals.
    ///
    /// NaN maps to [`RiskScore::MAX`] so that an unscorable supplier is
    /// routed to human review rather than approved.
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::MAX;
        }
        let clamped = raw.clamp(0.0, 1.0);
        // `+ 0.0` folds a negative zero into positive zero.
        Self((clamped * SCALE).round() / SCALE + 0.0)
    }

    /// The score as `f64`.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for RiskScore {
    fn from(raw: f64) -> Self {
        Self::new(raw)
    }
}

impl From<RiskScore> for f64 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for RiskScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
