//! # Integration Tests for scaudit-api
//!
//! Drives the router with `tower::ServiceExt::oneshot` against offline
//! providers: health probes, run lifecycle with and without a
//! human-in-the-loop pause, decision outcomes, cancellation and error
//! bodies.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use scaudit_api::state::AppState;
use scaudit_providers::{HeuristicSignalProvider, StaticDiscovery, TemplateReportProvider};
use scaudit_workflow::AuditEngine;

fn test_state() -> AppState {
    let engine = AuditEngine::new(
        Arc::new(HeuristicSignalProvider),
        Arc::new(TemplateReportProvider),
    );
    AppState::new(engine, Arc::new(StaticDiscovery::fallback()))
}

/// Helper: build the test app with offline providers and no metrics recorder.
fn test_app() -> axum::Router {
    scaudit_api::app(test_state())
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Poll the session until `done` holds, for at most five seconds.
async fn wait_for(app: &axum::Router, run_id: &str, done: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..500 {
        let session = body_json(get(app, &format!("/v1/audits/{run_id}")).await).await;
        if done(&session) {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("audit {run_id} did not reach the expected state");
}

fn status_is(expected: &'static str) -> impl Fn(&Value) -> bool {
    move |s| s["status"] == expected
}

async fn start(app: &axum::Router, body: Value) -> String {
    let response = post_json(app, "/v1/audits", body).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    body_json(response).await["run_id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn clean_supplier(name: &str) -> Value {
    json!({ "name": name, "industry": "Retail", "location": "Pune, India", "emissions": 0.1, "compliance_flags": 0 })
}

fn critical_supplier(name: &str) -> Value {
    json!({ "name": name, "industry": "Mining", "location": "Dhanbad, India", "emissions": 1.0, "compliance_flags": 5 })
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = get(&test_app(), "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = get(&test_app(), "/health/readiness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_metrics_unavailable_without_recorder() {
    let response = get(&test_app(), "/metrics").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Run Lifecycle --------------------------------------------------------------

#[tokio::test]
async fn test_run_without_hitl_completes_with_report() {
    let app = test_app();
    let run_id = start(
        &app,
        json!({ "company_id": "Tata Motors", "suppliers": [clean_supplier("A"), clean_supplier("B")] }),
    )
    .await;

    let session = wait_for(&app, &run_id, status_is("completed")).await;
    assert_eq!(session["records"].as_array().unwrap().len(), 2);
    assert_eq!(session["records"][0]["disposition"], "approved");
    assert_eq!(session["summary"]["approved"], 2);
    assert_eq!(session["logs"][0]["message"], "Starting audit for Tata Motors...");
    assert_eq!(session["logs"][0]["source"], "Orchestrator");
    assert_eq!(session["report"]["fallback"], false);
    assert!(session["report"]["markdown"]
        .as_str()
        .unwrap()
        .contains("Executive ESG Risk Report: Tata Motors"));
    assert!(session.get("pending").is_none());
}

#[tokio::test]
async fn test_absent_suppliers_uses_discovery() {
    let app = test_app();
    let response = post_json(&app, "/v1/audits", json!({ "company_id": "Tata Motors" })).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["suppliers"], 3);

    let run_id = body["run_id"].as_str().unwrap().to_string();
    let session = wait_for(&app, &run_id, |s| {
        s["status"] != "running" && s["status"] != "awaiting_decision"
    })
    .await;
    assert_eq!(session["records"][0]["supplier_name"], "Global Steel Co");
}

#[tokio::test]
async fn test_hitl_pause_and_approve() {
    let app = test_app();
    let run_id = start(
        &app,
        json!({
            "company_id": "Tata Motors",
            "suppliers": [clean_supplier("Clean"), critical_supplier("Critical"), clean_supplier("After")]
        }),
    )
    .await;

    let session = wait_for(&app, &run_id, status_is("awaiting_decision")).await;
    assert_eq!(session["pending"]["supplier_name"], "Critical");
    assert_eq!(session["pending"]["score"], "1.000");
    assert_eq!(session["pending"]["emissions"], "1.00");
    assert_eq!(
        session["pending"]["explanation"],
        "Score exceeds 0.8 threshold. Human authorization required to proceed."
    );
    assert_eq!(session["records"].as_array().unwrap().len(), 1);

    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["outcome"], "resolved");

    let session = wait_for(&app, &run_id, status_is("completed")).await;
    let records = session["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["disposition"], "approved");
    assert_eq!(records[1]["human_decision"], true);
    assert!(session["logs"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["message"] == "Reviewer overrode HITL. Supplier approved."));
}

#[tokio::test]
async fn test_hitl_reject_with_token_then_stale_token() {
    let app = test_app();
    let run_id = start(
        &app,
        json!({ "company_id": "c", "suppliers": [critical_supplier("First"), critical_supplier("Second")] }),
    )
    .await;
    let session = wait_for(&app, &run_id, status_is("awaiting_decision")).await;
    assert_eq!(session["pending"]["supplier_name"], "First");
    let first_token = session["pending"]["token"].clone();

    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": false, "token": first_token }),
    )
    .await;
    assert_eq!(body_json(response).await["outcome"], "resolved");

    let session = wait_for(&app, &run_id, |s| {
        s["status"] == "awaiting_decision" && s["pending"]["supplier_name"] == "Second"
    })
    .await;
    assert_eq!(session["records"][0]["disposition"], "rejected");

    // The spent token does not touch the second decision.
    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": true, "token": first_token }),
    )
    .await;
    assert_eq!(body_json(response).await["outcome"], "stale_token");

    let second_token = session["pending"]["token"].clone();
    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": true, "token": second_token }),
    )
    .await;
    assert_eq!(body_json(response).await["outcome"], "resolved");

    let session = wait_for(&app, &run_id, status_is("completed")).await;
    assert_eq!(session["summary"]["rejected"], 1);
    assert_eq!(session["summary"]["approved"], 1);
}

#[tokio::test]
async fn test_decision_without_pending_is_noop() {
    let app = test_app();
    let run_id = start(
        &app,
        json!({ "company_id": "c", "suppliers": [clean_supplier("A")] }),
    )
    .await;
    wait_for(&app, &run_id, status_is("completed")).await;

    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["outcome"], "no_pending_decision");
}

#[tokio::test]
async fn test_cancel_while_awaiting_decision() {
    let app = test_app();
    let run_id = start(
        &app,
        json!({ "company_id": "c", "suppliers": [critical_supplier("Critical"), clean_supplier("Never")] }),
    )
    .await;
    wait_for(&app, &run_id, status_is("awaiting_decision")).await;

    let response = post_json(&app, &format!("/v1/audits/{run_id}/cancel"), json!({})).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["cancelled"], true);

    let session = wait_for(&app, &run_id, status_is("cancelled")).await;
    assert!(session.get("pending").is_none());
    assert!(session["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_finished_run_releases_control_but_keeps_session() {
    let state = test_state();
    let app = scaudit_api::app(state.clone());
    let run_id = start(
        &app,
        json!({ "company_id": "c", "suppliers": [clean_supplier("A")] }),
    )
    .await;
    wait_for(&app, &run_id, status_is("completed")).await;

    for _ in 0..500 {
        if state.controls.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(state.controls.is_empty());
    assert_eq!(state.sessions.len(), 1);

    let response = get(&app, &format!("/v1/audits/{run_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        &format!("/v1/audits/{run_id}/decision"),
        json!({ "approved": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["outcome"], "no_pending_decision");

    let response = post_json(&app, &format!("/v1/audits/{run_id}/cancel"), json!({})).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["cancelled"], false);
    assert_eq!(body["run_id"], run_id.as_str());
}

// -- Errors ---------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_run_is_404() {
    let app = test_app();
    let missing = uuid_like();
    let response = get(&app, &format!("/v1/audits/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let response = post_json(
        &app,
        &format!("/v1/audits/{missing}/decision"),
        json!({ "approved": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&app, &format!("/v1/audits/{missing}/cancel"), json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_company_is_422() {
    let response = post_json(&test_app(), "/v1/audits", json!({ "company_id": " " })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/audits")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

fn uuid_like() -> &'static str {
    "00000000-0000-4000-8000-000000000000"
}
