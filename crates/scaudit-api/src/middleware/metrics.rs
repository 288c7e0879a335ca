//! # Request Metrics
//!
//! Counts every request by matched route and response status class, via the
//! `metrics` facade. Without an installed recorder the counters are no-ops.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Counter of handled requests, labelled `route` and `status`.
pub const HTTP_REQUESTS_TOTAL: &str = "scaudit_http_requests_total";

/// Middleware that increments [`HTTP_REQUESTS_TOTAL`].
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = status_class(response.status().as_u16());
    metrics::counter!(HTTP_REQUESTS_TOTAL, "route" => route, "status" => status).increment(1);
    response
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}
