//! # Risk Signals
//!
//! Four independent boolean indicators plus free-text findings, produced
//! once per supplier by the signal provider and immutable thereafter.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of boolean signal kinds. Used as the signal normalizer.
pub const SIGNAL_KIND_COUNT: usize = 4;

/// Finding attached to the fallback signal set.
pub const UNVERIFIED_FINDING: &str =
    "System unable to verify external risks. Defaulting to low risk.";

/// The four signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Negative news coverage.
    AdverseMedia,
    /// Fines, lawsuits, or other regulator action.
    RegulatoryAction,
    /// Workplace accidents or safety citations.
    SafetyViolation,
    /// Pollution, labour-rights, or other ESG controversy.
    EsgControversy,
}

impl SignalKind {
    /// All signal kinds, in canonical order.
    pub const ALL: [SignalKind; SIGNAL_KIND_COUNT] = [
        Self::AdverseMedia,
        Self::RegulatoryAction,
        Self::SafetyViolation,
        Self::EsgControversy,
    ];

    /// The canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdverseMedia => "adverse_media",
            Self::RegulatoryAction => "regulatory_action",
            Self::SafetyViolation => "safety_violation",
            Self::EsgControversy => "esg_controversy",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SignalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "signal kind",
                value: s.to_string(),
            })
    }
}

/// The risk signals gathered for one supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSignals {
    /// Negative news coverage was found.
    #[serde(default, alias = "adverseMedia")]
    pub adverse_media: bool,
    /// Regulator action was found.
    #[serde(default, alias = "regulatoryAction")]
    pub regulatory_action: bool,
    /// A safety violation was found.
    #[serde(default, alias = "safetyViolation")]
    pub safety_violation: bool,
    /// An ESG controversy was found.
    #[serde(default, alias = "esgControversies", alias = "esg_controversies")]
    pub esg_controversy: bool,
    /// Free-text findings, in provider order.
    #[serde(default, alias = "details")]
    pub findings: Vec<String>,
}

impl RiskSignals {
    /// A signal set with every flag cleared and no findings.
    pub fn clear() -> Self {
        Self::default()
    }

    /// The fallback signal set returned when a provider cannot verify risks:
    /// all flags false, one explanatory finding.
    pub fn unverified() -> Self {
        Self {
            findings: vec![UNVERIFIED_FINDING.to_string()],
            ..Self::default()
        }
    }

    /// Builder: raise one signal.
    pub fn with_signal(mut self, kind: SignalKind) -> Self {
        self.set(kind, true);
        self
    }

    /// Builder: append a finding.
    pub fn with_finding(mut self, finding: impl Into<String>) -> Self {
        self.findings.push(finding.into());
        self
    }

    /// Whether the given signal is raised.
    pub fn is_raised(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::AdverseMedia => self.adverse_media,
            SignalKind::RegulatoryAction => self.regulatory_action,
            SignalKind::SafetyViolation => self.safety_violation,
            SignalKind::EsgControversy => self.esg_controversy,
        }
    }

    fn set(&mut self, kind: SignalKind, value: bool) {
        match kind {
            SignalKind::AdverseMedia => self.adverse_media = value,
            SignalKind::RegulatoryAction => self.regulatory_action = value,
            SignalKind::SafetyViolation => self.safety_violation = value,
            SignalKind::EsgControversy => self.esg_controversy = value,
        }
    }

    /// Number of raised signals, `0..=4`.
    pub fn raised_count(&self) -> usize {
        SignalKind::ALL.iter().filter(|k| self.is_raised(**k)).count()
    }

    /// Raised signal kinds, in canonical order.
    pub fn raised(&self) -> Vec<SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(|k| self.is_raised(*k))
            .collect()
    }

    /// Whether any findings were reported.
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}
