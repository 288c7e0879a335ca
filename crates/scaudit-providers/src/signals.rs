//! Risk signal providers.
//!
//! [`HttpSignalProvider`] asks the risk-intelligence service and degrades to
//! [`RiskSignals::unverified`] on any failure. [`HeuristicSignalProvider`]
//! derives signals offline from the supplier's own attributes.

use async_trait::async_trait;

use scaudit_core::{RiskSignals, SignalKind, Supplier};
use scaudit_workflow::{ProviderError, SignalProvider};

use crate::client::RiskIntelClient;

/// Signals from the risk-intelligence service.
#[derive(Debug, Clone)]
pub struct HttpSignalProvider {
    client: RiskIntelClient,
}

impl HttpSignalProvider {
    pub fn new(client: RiskIntelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SignalProvider for HttpSignalProvider {
    async fn retrieve_signals(&self, supplier: &Supplier) -> Result<RiskSignals, ProviderError> {
        match self.client.signals(supplier).await {
            Ok(signals) => Ok(signals),
            Err(e) => {
                tracing::warn!(supplier_id = %supplier.id, error = %e, "signal retrieval degraded to unverified");
                Ok(RiskSignals::unverified())
            }
        }
    }
}

/// Industries treated as high-emission for ESG controversy purposes.
const HEAVY_INDUSTRIES: &[&str] = &[
    "steel",
    "mining",
    "raw materials",
    "chemicals",
    "cement",
    "oil",
    "gas",
    "energy",
];

/// Industries with elevated workplace-safety exposure.
const HAZARDOUS_INDUSTRIES: &[&str] = &["mining", "chemicals", "construction"];

const ADVERSE_MEDIA_EMISSIONS: f64 = 0.7;
const REGULATORY_FLAGS: u32 = 3;
const SAFETY_FLAGS: u32 = 4;
const HAZARDOUS_SAFETY_FLAGS: u32 = 2;

fn industry_matches(industry: &str, list: &[&str]) -> bool {
    let industry = industry.to_ascii_lowercase();
    list.iter().any(|needle| industry.contains(needle))
}

/// Deterministic offline signals.
///
/// | Signal | Raised when |
/// |--------|-------------|
/// | ESG controversy | heavy industry |
/// | adverse media | emissions >= 0.7 |
/// | regulatory action | flags >= 3 |
/// | safety violation | flags >= 4, or hazardous industry with flags >= 2 |
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSignalProvider;

impl HeuristicSignalProvider {
    /// The signals for `supplier`. Pure.
    pub fn assess(&self, supplier: &Supplier) -> RiskSignals {
        let mut signals = RiskSignals::clear();
        let flags = supplier.compliance_flags;

        if industry_matches(&supplier.industry, HEAVY_INDUSTRIES) {
            signals = signals.with_signal(SignalKind::EsgControversy).with_finding(format!(
                "{} operates in a high-emission industry ({})",
                supplier.name, supplier.industry
            ));
        }
        if supplier.emissions >= ADVERSE_MEDIA_EMISSIONS {
            signals = signals.with_signal(SignalKind::AdverseMedia).with_finding(format!(
                "Emissions intensity {:.2} attracts negative coverage",
                supplier.emissions
            ));
        }
        if flags >= REGULATORY_FLAGS {
            signals = signals
                .with_signal(SignalKind::RegulatoryAction)
                .with_finding(format!("{flags} prior compliance flags on record"));
        }
        let hazardous = industry_matches(&supplier.industry, HAZARDOUS_INDUSTRIES);
        if flags >= SAFETY_FLAGS || (hazardous && flags >= HAZARDOUS_SAFETY_FLAGS) {
            signals = signals
                .with_signal(SignalKind::SafetyViolation)
                .with_finding(format!("Workplace safety citations at {}", supplier.location));
        }
        signals
    }
}

#[async_trait]
impl SignalProvider for HeuristicSignalProvider {
    async fn retrieve_signals(&self, supplier: &Supplier) -> Result<RiskSignals, ProviderError> {
        Ok(self.assess(supplier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaudit_core::SupplierId;

    fn supplier(industry: &str, emissions: f64, flags: u32) -> Supplier {
        Supplier::new(SupplierId::new("1").unwrap(), "Acme", industry, "Pune, India", emissions, flags).unwrap()
    }

    #[test]
    fn clean_supplier_has_no_signals() {
        let s = HeuristicSignalProvider.assess(&supplier("Retail", 0.2, 0));
        assert_eq!(s, RiskSignals::clear());
    }

    #[test]
    fn heavy_industry_raises_esg_controversy() {
        let s = HeuristicSignalProvider.assess(&supplier("Raw Materials", 0.2, 0));
        assert_eq!(s.raised(), vec![SignalKind::EsgControversy]);
        assert_eq!(s.findings.len(), 1);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let s = HeuristicSignalProvider.assess(&supplier("Retail", 0.7, 3));
        assert!(s.adverse_media);
        assert!(s.regulatory_action);
        assert!(!s.safety_violation);
    }

    #[test]
    fn hazardous_industry_lowers_safety_threshold() {
        assert!(HeuristicSignalProvider.assess(&supplier("Construction", 0.1, 2)).safety_violation);
        assert!(!HeuristicSignalProvider.assess(&supplier("Retail", 0.1, 2)).safety_violation);
        assert!(HeuristicSignalProvider.assess(&supplier("Retail", 0.1, 4)).safety_violation);
    }

    #[test]
    fn worst_case_raises_everything() {
        let s = HeuristicSignalProvider.assess(&supplier("Mining", 1.0, 5));
        assert_eq!(s.raised_count(), 4);
        assert_eq!(s.findings.len(), 4);
    }

    #[tokio::test]
    async fn provider_never_fails() {
        let s = HeuristicSignalProvider
            .retrieve_signals(&supplier("Steel", 0.9, 1))
            .await
            .unwrap();
        assert!(s.esg_controversy);
        assert!(s.adverse_media);
    }
}
