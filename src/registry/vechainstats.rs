// src/registry/vechainstats.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const VECHAINSTATS_API_URL: &str = "https://api.vechainstats.com/v2";

/// Client for the VeChainStats v2 API. Every response carries a
/// `{status: {success, message}}` envelope which is checked before the
/// payload is handed back. The API works without a key at reduced rate
/// limits; when configured, the key is sent as `X-API-Key`.
#[derive(Debug, Clone)]
pub struct VeChainStatsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl VeChainStatsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, VECHAINSTATS_API_URL)
    }

    /// Base-URL override used by tests.
    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("VeChainStats request: {}", url);

        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("VeChainStats API error: HTTP {}", status));
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {}", url))?;

        let ok = body
            .pointer("/status/success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !ok {
            let message = body
                .pointer("/status/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(anyhow!("VeChainStats API error: {}", message));
        }

        Ok(body)
    }
}
