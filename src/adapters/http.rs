use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::ProtocolConfig;
use crate::error::AdapterError;

/// Transport used by adapters to reach a protocol's REST endpoint.
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// GET `path` relative to the protocol base URL and decode the JSON body
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, AdapterError>;
}

/// `reqwest` implementation of [`EndpointClient`]
#[derive(Debug, Clone)]
pub struct HttpEndpointClient {
    http_client: reqwest::Client,
    api_url: String,
    /// `None` when `api_url` does not parse; every fetch then fails and callers fall back
    base_url: Option<Url>,
    request_timeout: Duration,
}

impl HttpEndpointClient {
    pub fn new(config: &ProtocolConfig) -> Result<Self, AdapterError> {
        let base_url = match Url::parse(&config.api_url) {
            Ok(mut url) => {
                // Url::join drops the last segment unless the base ends with '/'
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                Some(url)
            }
            Err(e) => {
                tracing::warn!(api_url = %config.api_url, error = %e, "Invalid API URL, live endpoint disabled");
                None
            }
        };

        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AdapterError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            base_url,
            request_timeout,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, AdapterError> {
        let base_url = self
            .base_url
            .as_ref()
            .ok_or_else(|| AdapterError::Transport(format!("Invalid API URL: {:?}", self.api_url)))?;
        base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AdapterError::InvalidData(format!("Invalid endpoint path {}: {}", path, e)))
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, AdapterError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "Fetching protocol endpoint");

        let response = timeout(self.request_timeout, self.http_client.get(url.clone()).query(params).send())
            .await
            .map_err(|_| AdapterError::Transport("Request timeout".to_string()))?
            .map_err(|e| AdapterError::Transport(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AdapterError::Transport(format!("HTTP error: {}", response.status())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AdapterError::InvalidData(format!("Failed to decode response from {}: {}", url, e)))
    }
}
