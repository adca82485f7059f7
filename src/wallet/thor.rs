// src/wallet/thor.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::core::types::TransactionClause;

/// REST client for a VeChain Thor node. Thor speaks plain JSON over
/// HTTP; there is no JSON-RPC layer on the node side.
#[derive(Debug, Clone)]
pub struct ThorClient {
    client: Client,
    base_url: String,
}

/// Account state from `GET /accounts/{address}`. Balance fields are
/// 0x-prefixed hex wei strings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountState {
    pub balance: String,
    pub energy: String,
    #[serde(default, rename = "hasCode")]
    pub has_code: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BestBlock {
    pub id: String,
    pub number: u64,
}

/// One output of a clause simulation via `POST /accounts/*`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationOutput {
    #[serde(default)]
    pub data: String,
    #[serde(default, rename = "gasUsed")]
    pub gas_used: u64,
    #[serde(default)]
    pub reverted: bool,
    #[serde(default, rename = "vmError")]
    pub vm_error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedTransaction {
    pub id: String,
}

impl ThorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_account(&self, address: &str) -> Result<AccountState> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        if !response.status().is_success() {
            return Err(anyhow!("Thor returned {} for {}", response.status(), url));
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid account response from {}", url))
    }

    pub async fn best_block(&self) -> Result<BestBlock> {
        let url = format!("{}/blocks/best", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        if !response.status().is_success() {
            return Err(anyhow!("Thor returned {} for {}", response.status(), url));
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid block response from {}", url))
    }

    /// Simulates clauses without submitting them. Thor runs the clauses
    /// against head state; used for gas estimation and read-only calls.
    pub async fn simulate(
        &self,
        clauses: &[TransactionClause],
        caller: &str,
    ) -> Result<Vec<SimulationOutput>> {
        let url = format!("{}/accounts/*", self.base_url);
        let payload = json!({ "clauses": clauses, "caller": caller });
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        if !response.status().is_success() {
            return Err(anyhow!("Thor returned {} for {}", response.status(), url));
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid simulation response from {}", url))
    }

    /// Submits a signed raw transaction. Thor answers rejections with a
    /// plain-text reason, which is worth surfacing verbatim.
    pub async fn submit_raw(&self, raw: &str) -> Result<SubmittedTransaction> {
        let url = format!("{}/transactions", self.base_url);
        debug!("Submitting raw transaction to {}", url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Transaction rejected by Thor ({}): {}",
                status,
                reason.trim()
            ));
        }
        response
            .json()
            .await
            .with_context(|| format!("Invalid submission response from {}", url))
    }
}
