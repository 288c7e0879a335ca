//! # scaudit-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).
//!
//! Providers come from `SCAUDIT_PROVIDER_URL` when set; otherwise the
//! offline heuristic signal and template report providers are used.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use scaudit_api::state::{AppConfig, AppState};
use scaudit_policy::AuditConfig;
use scaudit_providers::{
    HeuristicSignalProvider, HttpDiscovery, HttpReportProvider, HttpSignalProvider,
    ProviderConfig, RiskIntelClient, StaticDiscovery, TemplateReportProvider,
};
use scaudit_workflow::{AuditEngine, DiscoveryProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    let audit_config = match &config.audit_config {
        Some(path) => {
            let loaded = AuditConfig::load(path).map_err(|e| {
                tracing::error!("Audit configuration failed to load: {e}");
                e
            })?;
            tracing::info!(path = %path.display(), "audit configuration loaded");
            loaded
        }
        None => AuditConfig::default(),
    };

    let (engine, discovery): (AuditEngine, Arc<dyn DiscoveryProvider>) =
        match ProviderConfig::from_env() {
            Ok(provider_config) => {
                tracing::info!(?provider_config, "risk-intelligence provider configured");
                let client = RiskIntelClient::new(provider_config).map_err(|e| {
                    tracing::error!("Failed to create risk-intelligence client: {e}");
                    e
                })?;
                (
                    AuditEngine::new(
                        Arc::new(HttpSignalProvider::new(client.clone())),
                        Arc::new(HttpReportProvider::new(client.clone())),
                    ),
                    Arc::new(HttpDiscovery::new(client)),
                )
            }
            Err(e) => {
                tracing::warn!("Risk-intelligence provider not configured: {e}. Using offline providers.");
                (
                    AuditEngine::new(
                        Arc::new(HeuristicSignalProvider),
                        Arc::new(TemplateReportProvider),
                    ),
                    Arc::new(StaticDiscovery::fallback()),
                )
            }
        };
    let engine = engine.with_config(&audit_config);

    let prometheus = PrometheusBuilder::new().install_recorder()?;
    let state = AppState::new(engine, discovery).with_metrics(prometheus);
    let app = scaudit_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("scaudit API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
