//! Risk-intelligence client error types.

use scaudit_workflow::ProviderError;

/// Errors from risk-intelligence calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("risk service {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http { endpoint, source } => {
                ProviderError::Transport(format!("{endpoint}: {source}"))
            }
            ClientError::ApiError {
                endpoint,
                status,
                body,
            } => ProviderError::Status {
                endpoint,
                status,
                body,
            },
            ClientError::Deserialization { endpoint, source } => ProviderError::Decode {
                endpoint,
                reason: source.to_string(),
            },
            ClientError::Config(e) => ProviderError::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_status() {
        let err: ProviderError = ClientError::ApiError {
            endpoint: "POST /v1/signals".into(),
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert_eq!(
            err,
            ProviderError::Status {
                endpoint: "POST /v1/signals".into(),
                status: 502,
                body: "bad gateway".into(),
            }
        );
    }

    #[test]
    fn config_error_maps_to_unavailable() {
        let err: ProviderError = ClientError::Config(crate::config::ConfigError::MissingUrl).into();
        assert!(matches!(err, ProviderError::Unavailable(msg) if msg.contains("SCAUDIT_PROVIDER_URL")));
    }
}
