//! # Disposition
//!
//! The policy outcome for a supplier. The policy evaluator produces one of
//! `Approved`, `Review`, or `HitlTriggered`; `Rejected` is only reachable by
//! a reviewer confirming a `HitlTriggered` record.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Disposition of an audited supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Below the review threshold, or approved by a reviewer override.
    Approved,
    /// Elevated risk; flagged for follow-up but not blocking.
    Review,
    /// High risk; the pipeline pauses for a human decision.
    HitlTriggered,
    /// A reviewer confirmed the high-risk finding.
    Rejected,
}

impl Disposition {
    /// All dispositions, in ascending severity.
    pub const ALL: [Disposition; 4] = [
        Self::Approved,
        Self::Review,
        Self::HitlTriggered,
        Self::Rejected,
    ];

    /// The canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Review => "Review",
            Self::HitlTriggered => "HITL_Triggered",
            Self::Rejected => "Rejected",
        }
    }

    /// Severity rank used to compare dispositions: `Approved` < `Review` <
    /// `HitlTriggered` < `Rejected`.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Approved => 0,
            Self::Review => 1,
            Self::HitlTriggered => 2,
            Self::Rejected => 3,
        }
    }

    /// Whether this disposition blocks the pipeline until a human decides.
    pub fn requires_human_review(&self) -> bool {
        matches!(self, Self::HitlTriggered)
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Disposition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "review" => Ok(Self::Review),
            "hitl_triggered" | "hitl" => Ok(Self::HitlTriggered),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownVariant {
                kind: "disposition",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(Disposition::HitlTriggered.to_string(), "HITL_Triggered");
        assert_eq!(Disposition::Approved.to_string(), "Approved");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Disposition::HitlTriggered).unwrap();
        assert_eq!(json, "\"hitl_triggered\"");
        let back: Disposition = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, Disposition::Rejected);
    }

    #[test]
    fn from_str_accepts_display_names() {
        for d in Disposition::ALL {
            assert_eq!(d.as_str().parse::<Disposition>().unwrap(), d);
        }
        assert!("maybe".parse::<Disposition>().is_err());
    }

    #[test]
    fn severity_is_strictly_increasing() {
        let ranks: Vec<u8> = Disposition::ALL.iter().map(|d| d.severity()).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn only_hitl_requires_review() {
        assert!(Disposition::HitlTriggered.requires_human_review());
        assert!(!Disposition::Review.requires_human_review());
        assert!(!Disposition::Rejected.requires_human_review());
    }
}
