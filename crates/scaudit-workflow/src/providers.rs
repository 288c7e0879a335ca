//! # Collaborator Contracts
//!
//! The engine consumes signal retrieval and report generation through the
//! traits below, and callers discover suppliers through
//! [`DiscoveryProvider`] before starting a run. Implementations are
//! stateless services injected as `Arc<dyn Trait>`.
//!
//! A provider that fails internally is expected to *degrade*: return
//! [`RiskSignals::unverified`] or [`GeneratedReport::fallback`] instead of
//! an error. An `Err` reaching the engine is treated as unexpected and ends
//! the run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scaudit_core::{AuditRecord, Disposition, RiskScore, RiskSignals, Supplier};

/// Markdown returned when a report cannot be generated.
pub const REPORT_FALLBACK_TEXT: &str =
    "## Error Generating Report\nCould not generate the executive summary at this time.";

/// Errors raised by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The response decoded but violated a domain rule.
    #[error("invalid data from provider: {0}")]
    Invalid(String),

    /// The provider is not configured or not reachable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// One row of the report input, derived from a finalized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub score: RiskScore,
    pub status: Disposition,
    pub findings: Vec<String>,
}

impl From<&AuditRecord> for ReportRow {
    fn from(record: &AuditRecord) -> Self {
        Self {
            name: record.supplier_name.clone(),
            score: record.score,
            status: record.disposition(),
            findings: record.signals.findings.clone(),
        }
    }
}

/// Rows for every record, in order.
pub fn report_rows(records: &[AuditRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}

/// A rendered narrative report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReport {
    /// Markdown body.
    pub markdown: String,
    /// Whether this is the degraded fallback text.
    pub fallback: bool,
}

impl GeneratedReport {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            fallback: false,
        }
    }

    /// The fixed fallback report.
    pub fn fallback() -> Self {
        Self {
            markdown: REPORT_FALLBACK_TEXT.to_string(),
            fallback: true,
        }
    }
}

/// Supplies the supplier list for a company.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn discover(&self, company_id: &str) -> Result<Vec<Supplier>, ProviderError>;
}

/// Retrieves risk signals for one supplier.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    async fn retrieve_signals(&self, supplier: &Supplier) -> Result<RiskSignals, ProviderError>;
}

/// Renders the narrative report for a finished run.
#[async_trait]
pub trait ReportProvider: Send + Sync {
    async fn generate_report(
        &self,
        company_id: &str,
        records: &[AuditRecord],
    ) -> Result<GeneratedReport, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaudit_core::SupplierId;

    #[test]
    fn fallback_report_is_flagged() {
        let r = GeneratedReport::fallback();
        assert!(r.fallback);
        assert!(r.markdown.starts_with("## Error Generating Report"));
        assert!(!GeneratedReport::new("# ok").fallback);
    }

    #[test]
    fn report_rows_follow_record_order() {
        let mk = |id: &str, name: &str| {
            let s = Supplier::new(SupplierId::new(id).unwrap(), name, "i", "l", 0.1, 0).unwrap();
            AuditRecord::new(
                &s,
                RiskSignals::clear().with_finding("f"),
                RiskScore::new(0.1),
                Disposition::Approved,
            )
        };
        let rows = report_rows(&[mk("1", "A"), mk("2", "B")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[0].findings, vec!["f".to_string()]);
        assert_eq!(rows[0].status, Disposition::Approved);
    }

    #[test]
    fn provider_error_display() {
        let e = ProviderError::Status {
            endpoint: "/v1/signals".into(),
            status: 503,
            body: "down".into(),
        };
        assert_eq!(e.to_string(), "/v1/signals returned 503: down");
    }
}
