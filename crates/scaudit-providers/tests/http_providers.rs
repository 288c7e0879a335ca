//! Contract tests for the HTTP providers against a wiremock risk service.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/v1/suppliers/discover` | `discover_*` |
//! | POST | `/v1/signals` | `signals_*` |
//! | POST | `/v1/reports` | `report_*` |

use scaudit_core::{AuditRecord, Disposition, RiskScore, RiskSignals, Supplier, SupplierId};
use scaudit_providers::{
    discover_or_fallback, fallback_suppliers, HttpDiscovery, HttpReportProvider,
    HttpSignalProvider, ProviderConfig, RiskIntelClient,
};
use scaudit_workflow::{DiscoveryProvider, ProviderError, ReportProvider, SignalProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> RiskIntelClient {
    let config = ProviderConfig::parse(&mock_server.uri())
        .unwrap()
        .with_token("test-token")
        .with_timeout_secs(5);
    RiskIntelClient::new(config).unwrap()
}

fn supplier() -> Supplier {
    Supplier::new(
        SupplierId::new("sup-0-1").unwrap(),
        "Global Steel Co",
        "Raw Materials",
        "Mumbai, India",
        0.8,
        2,
    )
    .unwrap()
}

// ── POST /v1/suppliers/discover ──────────────────────────────────────

#[tokio::test]
async fn discover_sends_company_and_assigns_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/suppliers/discover"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({ "company_id": "Tata Motors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "name": "Jamshedpur Steel",
                "industry": "Steel",
                "location": "Jamshedpur, India",
                "estimatedEmissions": 0.9,
                "complianceFlags": 3
            },
            {
                "name": "Pune Castings",
                "industry": "Manufacturing",
                "location": "Pune, India",
                "estimated_emissions": 0.4,
                "compliance_flags": 1
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = HttpDiscovery::new(test_client(&mock_server));
    let suppliers = provider.discover("Tata Motors").await.unwrap();

    assert_eq!(suppliers.len(), 2);
    assert!(suppliers[0].id.as_str().starts_with("sup-0-"));
    assert!(suppliers[1].id.as_str().starts_with("sup-1-"));
    assert_eq!(suppliers[0].emissions, 0.9);
    assert_eq!(suppliers[1].compliance_flags, 1);
}

#[tokio::test]
async fn discover_server_error_is_surfaced_then_replaced_by_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/suppliers/discover"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = HttpDiscovery::new(test_client(&mock_server));
    let err = provider.discover("Tata Motors").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 500, .. }));

    let suppliers = discover_or_fallback(&provider, "Tata Motors").await;
    assert_eq!(suppliers, fallback_suppliers());
}

#[tokio::test]
async fn discover_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/suppliers/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Here are five suppliers: ..."))
        .mount(&mock_server)
        .await;

    let provider = HttpDiscovery::new(test_client(&mock_server));
    assert!(matches!(
        provider.discover("x").await,
        Err(ProviderError::Decode { .. })
    ));
}

// ── POST /v1/signals ─────────────────────────────────────────────────

#[tokio::test]
async fn signals_parses_provider_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/signals"))
        .and(body_partial_json(serde_json::json!({
            "supplier": { "id": "sup-0-1", "name": "Global Steel Co" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "adverseMedia": true,
            "regulatoryAction": false,
            "safetyViolation": false,
            "esgControversies": true,
            "details": ["Slag dumping reported near Thane creek"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = HttpSignalProvider::new(test_client(&mock_server));
    let signals = provider.retrieve_signals(&supplier()).await.unwrap();
    assert!(signals.adverse_media);
    assert!(signals.esg_controversy);
    assert_eq!(signals.raised_count(), 2);
    assert_eq!(signals.findings.len(), 1);
}

#[tokio::test]
async fn signals_failure_degrades_to_unverified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/signals"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = HttpSignalProvider::new(test_client(&mock_server));
    let signals = provider.retrieve_signals(&supplier()).await.unwrap();
    assert_eq!(signals, RiskSignals::unverified());
}

#[tokio::test]
async fn signals_unreachable_service_degrades() {
    let config = ProviderConfig::parse("http://127.0.0.1:9").unwrap().with_timeout_secs(1);
    let provider = HttpSignalProvider::new(RiskIntelClient::new(config).unwrap());
    let signals = provider.retrieve_signals(&supplier()).await.unwrap();
    assert_eq!(signals, RiskSignals::unverified());
}

// ── POST /v1/reports ─────────────────────────────────────────────────

fn records() -> Vec<AuditRecord> {
    vec![AuditRecord::new(
        &supplier(),
        RiskSignals::clear().with_finding("Smelter fine"),
        RiskScore::new(0.515),
        Disposition::Review,
    )]
}

#[tokio::test]
async fn report_sends_summary_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/reports"))
        .and(body_partial_json(serde_json::json!({
            "company_id": "Tata Motors",
            "suppliers": [{
                "name": "Global Steel Co",
                "score": 0.515,
                "status": "review",
                "findings": ["Smelter fine"]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "markdown": "# Executive ESG Risk Report\n..."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = HttpReportProvider::new(test_client(&mock_server));
    let report = provider.generate_report("Tata Motors", &records()).await.unwrap();
    assert!(!report.fallback);
    assert!(report.markdown.starts_with("# Executive ESG Risk Report"));
}

#[tokio::test]
async fn report_failure_degrades_to_fallback_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/reports"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = HttpReportProvider::new(test_client(&mock_server));
    let report = provider.generate_report("Tata Motors", &records()).await.unwrap();
    assert!(report.fallback);
    assert_eq!(
        report.markdown,
        "## Error Generating Report\nCould not generate the executive summary at this time."
    );
}

#[tokio::test]
async fn report_empty_markdown_degrades() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "markdown": "" })))
        .mount(&mock_server)
        .await;

    let provider = HttpReportProvider::new(test_client(&mock_server));
    let report = provider.generate_report("c", &records()).await.unwrap();
    assert!(report.fallback);
}
