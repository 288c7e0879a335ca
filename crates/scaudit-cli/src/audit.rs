//! # Run Subcommand
//!
//! Runs one audit end to end. Log events are printed as they arrive; when
//! the run pauses for a high-risk supplier the decision comes from stdin or
//! from `--decision`.
//!
//! Exit codes: 0 completed, 1 failed, 2 cancelled or input error.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Deserialize;

use scaudit_core::{Supplier, SupplierId, Timestamp};
use scaudit_providers::discover_or_fallback;
use scaudit_workflow::{AuditEngine, AuditEvent, AuditOutcome, DecisionView, RunStatus};

use crate::Providers;

/// How human-in-the-loop decisions are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionMode {
    /// Ask on stdin.
    Prompt,
    /// Approve every flagged supplier.
    Approve,
    /// Reject every flagged supplier.
    Reject,
}

/// Arguments for the `scaudit run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Company to audit.
    #[arg(long)]
    pub company: String,

    /// JSON file with the supplier list. Discovery is used when absent.
    #[arg(long, value_name = "FILE")]
    pub suppliers: Option<PathBuf>,

    /// How to resolve human-in-the-loop decisions.
    #[arg(long, value_enum, default_value_t = DecisionMode::Prompt)]
    pub decision: DecisionMode,

    /// Write the Markdown report to this path.
    #[arg(long, value_name = "PATH")]
    pub report_out: Option<PathBuf>,

    /// Print events as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Use the offline providers even when a service is configured.
    #[arg(long)]
    pub offline: bool,
}

/// One entry of a supplier file. Ids are assigned by position when absent.
#[derive(Debug, Deserialize)]
struct SupplierEntry {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    location: String,
    #[serde(alias = "estimated_emissions", alias = "estimatedEmissions")]
    emissions: f64,
    #[serde(default, alias = "complianceFlags")]
    compliance_flags: u32,
}

/// Read and validate a JSON supplier file.
pub fn load_suppliers(path: &Path) -> Result<Vec<Supplier>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read supplier file: {}", path.display()))?;
    let entries: Vec<SupplierEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse supplier file: {}", path.display()))?;

    let millis = Timestamp::now().epoch_millis();
    entries
        .into_iter()
        .enumerate()
        .map(|(index, e)| {
            let id = match e.id {
                Some(id) => SupplierId::new(id)?,
                None => SupplierId::indexed(index, millis),
            };
            Supplier::new(id, e.name, e.industry, e.location, e.emissions, e.compliance_flags)
                .with_context(|| format!("invalid supplier at index {index}"))
        })
        .collect()
}

/// Parse a reviewer's answer. Anything but an explicit yes rejects.
pub fn parse_answer(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "approve" | "a"
    )
}

fn prompt(view: &DecisionView) -> Result<bool> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "\n{view}")?;
    write!(stderr, "Approve this supplier? [y/N] ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(parse_answer(&line))
}

/// Render one event for the terminal. `None` for events that print nothing.
pub fn render_event(event: &AuditEvent, json: bool) -> Result<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string(event)?));
    }
    Ok(match event {
        AuditEvent::Log(log) => Some(log.to_string()),
        AuditEvent::DecisionResolved {
            supplier_id,
            disposition,
            ..
        } => Some(format!("decision recorded: {supplier_id} -> {disposition}")),
        _ => None,
    })
}

/// Drive a started run to completion, writing events to `out`.
pub async fn execute(
    engine: &AuditEngine,
    company_id: &str,
    suppliers: Vec<Supplier>,
    mode: DecisionMode,
    json: bool,
    out: &mut impl Write,
) -> Result<AuditOutcome> {
    let mut run = engine.start_audit(company_id, suppliers);
    while let Some(event) = run.next_event().await {
        if let Some(line) = render_event(&event, json)? {
            writeln!(out, "{line}")?;
        }
        if let AuditEvent::AwaitingDecision(pending) = &event {
            let approved = match mode {
                DecisionMode::Approve => true,
                DecisionMode::Reject => false,
                DecisionMode::Prompt => {
                    let view = pending.view();
                    tokio::task::spawn_blocking(move || prompt(&view))
                        .await
                        .context("decision prompt panicked")??
                }
            };
            let outcome = run.control.submit_decision_for(&pending.token, approved);
            tracing::debug!(token = %pending.token, approved, %outcome, "decision submitted");
        }
    }
    Ok(run.outcome().await?)
}

/// Execute the run subcommand.
pub fn run_audit(args: &RunArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_audit_config(config_path)?;
    let providers = Providers::from_env(args.offline)?;
    let rt = crate::runtime()?;

    let outcome = rt.block_on(async {
        let suppliers = match &args.suppliers {
            Some(path) => load_suppliers(path)?,
            None => discover_or_fallback(providers.discovery.as_ref(), &args.company).await,
        };
        tracing::info!(company = %args.company, suppliers = suppliers.len(), "starting audit");
        let engine = AuditEngine::new(providers.signals.clone(), providers.reports.clone())
            .with_config(&config);
        let mut stdout = std::io::stdout().lock();
        execute(&engine, &args.company, suppliers, args.decision, args.json, &mut stdout).await
    })?;

    if let (Some(path), Some(report)) = (&args.report_out, &outcome.report) {
        std::fs::write(path, &report.markdown)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    if !args.json {
        print_summary(&outcome);
    }
    Ok(exit_code(outcome.status))
}

fn print_summary(outcome: &AuditOutcome) {
    let summary = outcome.results.summary();
    println!();
    println!("Run:       {}", outcome.run_id());
    println!("Status:    {}", outcome.status);
    println!(
        "Suppliers: {} (approved {}, review {}, rejected {})",
        summary.total(),
        summary.approved,
        summary.review,
        summary.rejected
    );
    if let Some(mean) = summary.mean_score {
        println!("Mean risk: {mean:.3}");
    }
    if let Some(error) = &outcome.error {
        println!("Error:     {error}");
    }
}

/// Process exit code for a run status.
pub fn exit_code(status: RunStatus) -> u8 {
    match status {
        RunStatus::Completed => 0,
        RunStatus::Failed => 1,
        RunStatus::Cancelled => 2,
    }
}
