//! Typed client for the risk-intelligence service.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/v1/suppliers/discover` | Suppliers for a company |
//! | POST | `/v1/signals` | Risk signals for one supplier |
//! | POST | `/v1/reports` | Narrative report for a finished audit |
//!
//! Each call is a single attempt. There is no retry layer.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use scaudit_core::{RiskSignals, Supplier};
use scaudit_workflow::ReportRow;

use crate::config::{ConfigError, ProviderConfig};
use crate::error::ClientError;

/// A supplier as listed by the discovery endpoint, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredSupplier {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(alias = "estimatedEmissions")]
    pub estimated_emissions: f64,
    #[serde(alias = "complianceFlags")]
    pub compliance_flags: u32,
}

#[derive(Debug, Serialize)]
struct DiscoverRequest<'a> {
    company_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SignalsRequest<'a> {
    supplier: &'a Supplier,
}

#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    company_id: &'a str,
    suppliers: &'a [ReportRow],
}

/// Response of the report endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub markdown: String,
}

/// Client for the risk-intelligence service.
#[derive(Debug, Clone)]
pub struct RiskIntelClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl RiskIntelClient {
    /// Create a client from configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ClientError::Config(ConfigError::InvalidToken))?,
            );
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Calls `POST {base_url}/v1/suppliers/discover`.
    pub async fn discover(&self, company_id: &str) -> Result<Vec<DiscoveredSupplier>, ClientError> {
        self.post_json(
            "POST /v1/suppliers/discover",
            "v1/suppliers/discover",
            &DiscoverRequest { company_id },
        )
        .await
    }

    /// Calls `POST {base_url}/v1/signals`.
    pub async fn signals(&self, supplier: &Supplier) -> Result<RiskSignals, ClientError> {
        self.post_json("POST /v1/signals", "v1/signals", &SignalsRequest { supplier })
            .await
    }

    /// Calls `POST {base_url}/v1/reports`.
    pub async fn report(
        &self,
        company_id: &str,
        suppliers: &[ReportRow],
    ) -> Result<ReportResponse, ClientError> {
        self.post_json(
            "POST /v1/reports",
            "v1/reports",
            &ReportRequest {
                company_id,
                suppliers,
            },
        )
        .await
    }

    async fn post_json<B, T>(&self, endpoint: &str, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ClientError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}
