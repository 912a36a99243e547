//! Bulk-send provider integration.

use crate::{OutboundMessage, ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Capability to send one batch to the bulk-SMS provider.
///
/// There is no partial success: the whole batch either succeeds or fails.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn send(&self, batch: &[OutboundMessage]) -> ProviderResult<()>;
}

/// HTTP provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// Request payload for sending a batch.
#[derive(Debug, Serialize)]
struct SendBatchRequest<'a> {
    messages: &'a [OutboundMessage],
}

/// Optional response body from the provider.
#[derive(Debug, Deserialize)]
struct SendBatchResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Provider client posting batches as JSON to `{base_url}/messages`.
pub struct HttpProviderClient {
    config: ProviderConfig,
    client: Client,
}

impl HttpProviderClient {
    /// Create a new HTTP provider client.
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Endpoint batches are posted to.
    pub fn messages_url(&self) -> String {
        format!("{}/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn send(&self, batch: &[OutboundMessage]) -> ProviderResult<()> {
        let url = self.messages_url();
        debug!(url = %url, messages = batch.len(), "Sending batch");

        let mut request = self
            .client
            .post(&url)
            .json(&SendBatchRequest { messages: batch });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(());
        }

        match serde_json::from_str::<SendBatchResponse>(&body) {
            Ok(result) if !result.success => Err(ProviderError::Send(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            // A 2xx with an unrecognized body still counts as accepted
            _ => Ok(()),
        }
    }
}
