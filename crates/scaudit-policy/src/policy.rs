//! # Policy Evaluation
//!
//! Bands, lower bound inclusive:
//!
//! | score          | disposition     |
//! |----------------|-----------------|
//! | `< 0.5`        | `Approved`      |
//! | `[0.5, 0.8)`   | `Review`        |
//! | `>= 0.8`       | `HitlTriggered` |
//!
//! `Rejected` is never produced here.

use serde::{Deserialize, Serialize};

use scaudit_core::{Disposition, RiskScore};

/// Explanation shown to the reviewer of a `HitlTriggered` supplier.
pub const HITL_EXPLANATION: &str =
    "Score exceeds 0.8 threshold. Human authorization required to proceed.";

/// Lower bounds of the `Review` and `HitlTriggered` bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyThresholds {
    pub review: f64,
    pub hitl: f64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            review: 0.5,
            hitl: 0.8,
        }
    }
}

/// Stateless score-to-disposition policy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolicyEvaluator {
    thresholds: PolicyThresholds,
}

impl PolicyEvaluator {
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Evaluate a normalized score.
    pub fn evaluate(&self, score: RiskScore) -> Disposition {
        self.evaluate_raw(score.value())
    }

    /// Evaluate an arbitrary `f64`.
    ///
    /// NaN fails closed to `HitlTriggered`. Values outside `[0, 1]` fall
    /// into the nearest band.
    pub fn evaluate_raw(&self, score: f64) -> Disposition {
        if score.is_nan() || score >= self.thresholds.hitl {
            Disposition::HitlTriggered
        } else if score >= self.thresholds.review {
            Disposition::Review
        } else {
            Disposition::Approved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn band_boundaries() {
        let p = PolicyEvaluator::default();
        assert_eq!(p.evaluate_raw(0.49999), Disposition::Approved);
        assert_eq!(p.evaluate_raw(0.5), Disposition::Review);
        assert_eq!(p.evaluate_raw(0.79999), Disposition::Review);
        assert_eq!(p.evaluate_raw(0.8), Disposition::HitlTriggered);
    }

    #[test]
    fn normalized_scores_use_same_bands() {
        let p = PolicyEvaluator::default();
        assert_eq!(p.evaluate(RiskScore::new(0.515)), Disposition::Review);
        assert_eq!(p.evaluate(RiskScore::new(1.0)), Disposition::HitlTriggered);
        assert_eq!(p.evaluate(RiskScore::new(0.0)), Disposition::Approved);
    }

    #[test]
    fn out_of_range_and_nan_are_defensive() {
        let p = PolicyEvaluator::default();
        assert_eq!(p.evaluate_raw(-1.0), Disposition::Approved);
        assert_eq!(p.evaluate_raw(3.0), Disposition::HitlTriggered);
        assert_eq!(p.evaluate_raw(f64::NAN), Disposition::HitlTriggered);
        assert_eq!(p.evaluate_raw(f64::INFINITY), Disposition::HitlTriggered);
    }

    #[test]
    fn custom_thresholds_shift_bands() {
        let p = PolicyEvaluator::new(PolicyThresholds {
            review: 0.3,
            hitl: 0.6,
        });
        assert_eq!(p.evaluate_raw(0.3), Disposition::Review);
        assert_eq!(p.evaluate_raw(0.6), Disposition::HitlTriggered);
    }

    proptest! {
        #[test]
        fn never_rejects(score in proptest::num::f64::ANY) {
            prop_assert_ne!(PolicyEvaluator::default().evaluate_raw(score), Disposition::Rejected);
        }

        #[test]
        fn severity_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let p = PolicyEvaluator::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(p.evaluate_raw(lo).severity() <= p.evaluate_raw(hi).severity());
        }
    }
}
