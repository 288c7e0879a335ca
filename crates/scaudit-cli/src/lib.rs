//! # scaudit-cli — Command-Line Tool for Supplier Audits
//!
//! Provides the `scaudit` command-line interface.
//!
//! ## Subcommands
//!
//! - `scaudit run`: Audit a company's suppliers, pausing for a reviewer on
//!   high-risk suppliers.
//! - `scaudit score`: Score one supplier from raw numbers.
//! - `scaudit discover`: List a company's suppliers.
//!
//! ```bash
//! scaudit run --company "Tata Motors" --decision prompt --report-out report.md
//! scaudit score --emissions 0.8 --flags 2 --signal adverse_media
//! scaudit -v discover --company "Tata Motors" --json
//! ```
//!
//! ## Providers
//!
//! With `SCAUDIT_PROVIDER_URL` set, discovery, signals and reports go to the
//! risk-intelligence service. Otherwise, or with `--offline`, the heuristic
//! signal provider, template report and fallback supplier list are used.

pub mod audit;
pub mod discover;
pub mod score;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use scaudit_policy::AuditConfig;
use scaudit_providers::{
    HeuristicSignalProvider, HttpDiscovery, HttpReportProvider, HttpSignalProvider,
    ProviderConfig, RiskIntelClient, StaticDiscovery, TemplateReportProvider,
};
use scaudit_workflow::{DiscoveryProvider, ReportProvider, SignalProvider};

/// Load the audit configuration, or the defaults when no path is given.
pub fn load_audit_config(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(path) => AuditConfig::load(path)
            .with_context(|| format!("failed to load audit config: {}", path.display())),
        None => Ok(AuditConfig::default()),
    }
}

/// The three collaborators an audit needs.
#[derive(Clone)]
pub struct Providers {
    pub discovery: Arc<dyn DiscoveryProvider>,
    pub signals: Arc<dyn SignalProvider>,
    pub reports: Arc<dyn ReportProvider>,
    /// Whether these are the offline providers.
    pub offline: bool,
}

impl Providers {
    /// Heuristic signals, template reports and the fallback supplier list.
    pub fn offline() -> Self {
        Self {
            discovery: Arc::new(StaticDiscovery::fallback()),
            signals: Arc::new(HeuristicSignalProvider),
            reports: Arc::new(TemplateReportProvider),
            offline: true,
        }
    }

    /// All three backed by one risk-intelligence client.
    pub fn http(config: ProviderConfig) -> Result<Self> {
        let client = RiskIntelClient::new(config).context("failed to create risk-intelligence client")?;
        Ok(Self {
            discovery: Arc::new(HttpDiscovery::new(client.clone())),
            signals: Arc::new(HttpSignalProvider::new(client.clone())),
            reports: Arc::new(HttpReportProvider::new(client)),
            offline: false,
        })
    }

    /// HTTP providers when the environment configures them, offline otherwise.
    pub fn from_env(force_offline: bool) -> Result<Self> {
        if force_offline {
            return Ok(Self::offline());
        }
        match ProviderConfig::from_env() {
            Ok(config) => {
                tracing::info!(?config, "using risk-intelligence providers");
                Self::http(config)
            }
            Err(e) => {
                tracing::info!("{e}; using offline providers");
                Ok(Self::offline())
            }
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("offline", &self.offline)
            .finish_non_exhaustive()
    }
}

/// Build the multi-threaded runtime used by the async subcommands.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_config_path_gives_defaults() {
        assert_eq!(load_audit_config(None).unwrap(), AuditConfig::default());
    }

    #[test]
    fn missing_config_file_is_error_with_path() {
        let err = load_audit_config(Some(Path::new("/nonexistent/scaudit.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/scaudit.yaml"));
    }

    #[test]
    fn forced_offline() {
        assert!(Providers::from_env(true).unwrap().offline);
    }
}
