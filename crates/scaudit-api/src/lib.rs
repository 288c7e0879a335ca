//! # scaudit-api — HTTP Service for Supplier Audits
//!
//! Exposes the audit engine over HTTP. A client starts a run, polls its
//! session for log lines and records, answers the human-in-the-loop
//! decision when the run pauses, and reads the report when it finishes.
//!
//! ## API Surface
//!
//! | Path | Module | Purpose |
//! |------|--------|---------|
//! | `/v1/audits/*` | [`routes::audits`] | Run lifecycle |
//! | `/health/*` | this module | Liveness and readiness probes |
//! | `/metrics` | this module | Prometheus text exposition |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No authentication and no persistence. Sessions live in memory.
//! - Handlers never block on a run; starting returns `202 Accepted`.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::audits::router())
        .route("/metrics", get(render_metrics))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe. Always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics: Prometheus exposition of the installed recorder.
async fn render_metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}
