//! Report providers.
//!
//! [`HttpReportProvider`] renders through the risk-intelligence service and
//! degrades to [`GeneratedReport::fallback`]. [`TemplateReportProvider`]
//! renders Markdown locally from the report rows.

use std::fmt::Write as _;

use async_trait::async_trait;

use scaudit_core::{AuditRecord, Disposition};
use scaudit_workflow::{report_rows, GeneratedReport, ProviderError, ReportProvider, ReportRow};

use crate::client::RiskIntelClient;

/// Reports from the risk-intelligence service.
#[derive(Debug, Clone)]
pub struct HttpReportProvider {
    client: RiskIntelClient,
}

impl HttpReportProvider {
    pub fn new(client: RiskIntelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportProvider for HttpReportProvider {
    async fn generate_report(
        &self,
        company_id: &str,
        records: &[AuditRecord],
    ) -> Result<GeneratedReport, ProviderError> {
        let rows = report_rows(records);
        match self.client.report(company_id, &rows).await {
            Ok(resp) if !resp.markdown.trim().is_empty() => Ok(GeneratedReport::new(resp.markdown)),
            Ok(_) => {
                tracing::warn!(company_id, "report service returned an empty document");
                Ok(GeneratedReport::fallback())
            }
            Err(e) => {
                tracing::warn!(company_id, error = %e, "report generation degraded to fallback");
                Ok(GeneratedReport::fallback())
            }
        }
    }
}

/// Offline Markdown report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReportProvider;

impl TemplateReportProvider {
    /// Render the report for `rows`. Pure.
    pub fn render(&self, company_id: &str, rows: &[ReportRow]) -> String {
        let count = |d: Disposition| rows.iter().filter(|r| r.status == d).count();
        let approved = count(Disposition::Approved);
        let review = count(Disposition::Review);
        let hitl = count(Disposition::HitlTriggered);
        let rejected = count(Disposition::Rejected);
        let mean = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.score.value()).sum::<f64>() / rows.len() as f64
        };

        let mut out = String::new();
        let _ = writeln!(out, "# Executive ESG Risk Report: {company_id}\n");

        let _ = writeln!(out, "## Executive Summary\n");
        let _ = writeln!(
            out,
            "Audited **{}** suppliers with a mean risk score of **{mean:.3}**. \
             **{}** require follow-up and **{rejected}** were rejected after human review.\n",
            rows.len(),
            review + hitl,
        );

        let _ = writeln!(out, "## Risk Drivers\n");
        let mut drivers: Vec<&ReportRow> = rows
            .iter()
            .filter(|r| r.status != Disposition::Approved || !r.findings.is_empty())
            .collect();
        drivers.sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));
        if drivers.is_empty() {
            let _ = writeln!(out, "- No material risk drivers identified.");
        }
        for row in drivers {
            let _ = write!(out, "- **{}** (score {}, {})", row.name, row.score, row.status);
            if !row.findings.is_empty() {
                let _ = write!(out, ": {}", row.findings.join("; "));
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## Supplier Classification\n");
        let _ = writeln!(out, "| Status | Suppliers |");
        let _ = writeln!(out, "|--------|-----------|");
        for (d, n) in [
            (Disposition::Approved, approved),
            (Disposition::Review, review),
            (Disposition::HitlTriggered, hitl),
            (Disposition::Rejected, rejected),
        ] {
            let _ = writeln!(out, "| {d} | {n} |");
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "## Policy Recommendations\n");
        if rejected > 0 {
            let _ = writeln!(
                out,
                "- Suspend sourcing from rejected suppliers and record the reviewer rationale."
            );
        }
        if review > 0 {
            let _ = writeln!(
                out,
                "- Schedule enhanced due diligence for suppliers under review."
            );
        }
        if rejected == 0 && review == 0 {
            let _ = writeln!(out, "- Maintain the current monitoring cadence.");
        }
        let _ = writeln!(
            out,
            "- Re-run this audit after material supplier changes."
        );
        out
    }
}

#[async_trait]
impl ReportProvider for TemplateReportProvider {
    async fn generate_report(
        &self,
        company_id: &str,
        records: &[AuditRecord],
    ) -> Result<GeneratedReport, ProviderError> {
        Ok(GeneratedReport::new(self.render(company_id, &report_rows(records))))
    }
}
