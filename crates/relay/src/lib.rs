//! Best-effort mirror of successful scans to a remote relay endpoint.
//!
//! The relay is a secondary, append-only record of every barcode ever seen.
//! It sits outside the ledger's consistency contract: a forward failure is
//! logged and swallowed, never surfaced as a ledger or command failure.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use stokr_core::config::RelayConfig;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay client could not be built: {0}")]
    Build(#[source] reqwest::Error),
    #[error("relay request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("relay endpoint returned status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    barcode: &'a str,
}

/// HTTP client for the relay endpoint. Construct once and reuse; `forward`
/// never retries and applies the configured timeout per request.
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl RelayClient {
    /// Returns `None` when the relay is disabled in config.
    pub fn from_config(config: &RelayConfig) -> Result<Option<Self>, RelayError> {
        if !config.enabled {
            return Ok(None);
        }
        let endpoint = match config.endpoint.as_deref() {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            // Validation rejects this combination; treat it as disabled.
            None => return Ok(None),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RelayError::Build)?;

        Ok(Some(Self { client, endpoint, token: config.token.clone() }))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn forward(&self, barcode: &str) -> Result<(), RelayError> {
        let url = format!("{}/api/scans", self.endpoint);
        let mut request = self.client.post(&url).json(&ScanReport { barcode });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(RelayError::Request)?;
        if !response.status().is_success() {
            return Err(RelayError::Status(response.status().as_u16()));
        }

        debug!(
            event_name = "relay.forward.ok",
            barcode = %barcode,
            "scan mirrored to relay endpoint"
        );
        Ok(())
    }

    /// Fire-and-forget wrapper: logs failures at warn and always returns.
    pub async fn forward_best_effort(&self, barcode: &str) {
        if let Err(error) = self.forward(barcode).await {
            warn!(
                event_name = "relay.forward.failed",
                barcode = %barcode,
                error = %error,
                "scan could not be mirrored; ledger state is unaffected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use stokr_core::config::RelayConfig;

    use super::RelayClient;

    fn enabled_config(endpoint: &str) -> RelayConfig {
        RelayConfig {
            enabled: true,
            endpoint: Some(endpoint.to_string()),
            token: None,
            timeout_secs: 1,
        }
    }

    #[test]
    fn disabled_relay_builds_no_client() {
        let config = RelayConfig { enabled: false, endpoint: None, token: None, timeout_secs: 5 };
        assert!(RelayClient::from_config(&config).expect("build succeeds").is_none());
    }

    #[test]
    fn endpoint_trailing_slash_is_normalized() {
        let client = RelayClient::from_config(&enabled_config("https://relay.example.com/"))
            .expect("build succeeds")
            .expect("relay enabled");
        assert_eq!(client.endpoint(), "https://relay.example.com");
    }

    #[tokio::test]
    async fn best_effort_forward_swallows_unreachable_endpoint() {
        // Reserved TEST-NET-1 address; connection fails fast with the 1s timeout.
        let client = RelayClient::from_config(&enabled_config("http://192.0.2.1:9"))
            .expect("build succeeds")
            .expect("relay enabled");

        client.forward_best_effort("111").await;
        assert!(client.forward("111").await.is_err());
    }
}
