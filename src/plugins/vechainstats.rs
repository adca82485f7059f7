// src/plugins/vechainstats.rs
//
// Read-only analytics tools backed by the VeChainStats REST API. None
// of these touch the wallet; they are registered as plain handlers and
// share one HTTP client.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::plugin::Plugin;
use crate::core::registration::ToolRegistration;
use crate::core::schema::{NoParameters, ToolParameters};
use crate::core::types::Chain;
use crate::core::wallet::WalletClient;
use crate::registry::vechainstats::VeChainStatsClient;
use crate::utils::normalize_address;

#[derive(Debug, Deserialize)]
pub struct AccountParameters {
    pub address: String,
}

impl ToolParameters for AccountParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "VeChain address to look up"
                }
            },
            "required": ["address"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PagedAccountParameters {
    pub address: String,
    #[serde(default)]
    pub page: Option<u32>,
}

impl ToolParameters for PagedAccountParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "VeChain address to look up"
                },
                "page": {
                    "type": "integer",
                    "description": "Result page, starting at 1"
                }
            },
            "required": ["address"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenQueryParameters {
    pub token: String,
}

impl ToolParameters for TokenQueryParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "Token symbol (e.g. \"VET\")"
                }
            },
            "required": ["token"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TransactionStatusParameters {
    pub tx_id: String,
}

impl ToolParameters for TransactionStatusParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "tx_id": {
                    "type": "string",
                    "description": "Transaction id to look up"
                }
            },
            "required": ["tx_id"]
        })
    }
}

/// Analytics tools served by VeChainStats.
pub struct VeChainStatsPlugin<W> {
    registrations: Vec<ToolRegistration<W>>,
}

impl<W: WalletClient> VeChainStatsPlugin<W> {
    pub fn new(client: Arc<VeChainStatsClient>) -> Self {
        let registrations = vec![
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_account_info",
                    "Get account details from VeChainStats",
                    move |params: AccountParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            let address = normalize_address(&params.address)?;
                            client.request("/account/info", &[("address", address)]).await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_vet_vtho",
                    "Get VET and VTHO balances for an address from VeChainStats",
                    move |params: AccountParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            let address = normalize_address(&params.address)?;
                            client
                                .request("/account/vet-vtho", &[("address", address)])
                                .await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_token_transfers",
                    "List VIP-180 token transfers for an address",
                    move |params: PagedAccountParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            let address = normalize_address(&params.address)?;
                            let mut query = vec![
                                ("address", address),
                                ("token_type", "vip180".to_string()),
                                ("sort", "desc".to_string()),
                            ];
                            if let Some(page) = params.page {
                                query.push(("page", page.to_string()));
                            }
                            client.request("/account/token-transfers", &query).await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_dex_trades",
                    "List DEX trades for an address",
                    move |params: PagedAccountParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            let address = normalize_address(&params.address)?;
                            let mut query =
                                vec![("address", address), ("sort", "desc".to_string())];
                            if let Some(page) = params.page {
                                query.push(("page", page.to_string()));
                            }
                            client.request("/account/dex-trades", &query).await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_token_price",
                    "Get the current price of a token",
                    move |params: TokenQueryParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            client
                                .request("/token/price", &[("token", params.token.to_uppercase())])
                                .await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_token_supply",
                    "Get the circulating supply of a token",
                    move |params: TokenQueryParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            client
                                .request("/token/supply", &[("token", params.token.to_uppercase())])
                                .await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_transaction_status",
                    "Get the status of a transaction",
                    move |params: TransactionStatusParameters| {
                        let client = Arc::clone(&client);
                        async move {
                            client
                                .request("/transaction/status", &[("txid", params.tx_id)])
                                .await
                        }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_block_height",
                    "Get the current best block height",
                    move |_params: NoParameters| {
                        let client = Arc::clone(&client);
                        async move { client.request("/block/height", &[]).await }
                    },
                )
            },
            {
                let client = Arc::clone(&client);
                ToolRegistration::plain(
                    "vechainstats_get_network_stats",
                    "Get VeChain network statistics",
                    move |_params: NoParameters| {
                        let client = Arc::clone(&client);
                        async move { client.request("/network/stats", &[]).await }
                    },
                )
            },
        ];
        Self { registrations }
    }
}

impl<W: WalletClient> Plugin<W> for VeChainStatsPlugin<W> {
    fn name(&self) -> &str {
        "vechainstats"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        chain.chain_type == "vechain"
    }

    fn registrations(&self) -> &[ToolRegistration<W>] {
        &self.registrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_parameters_default_to_no_page() {
        let params: PagedAccountParameters =
            serde_json::from_value(json!({"address": "0xabc"})).unwrap();
        assert!(params.page.is_none());

        let params: PagedAccountParameters =
            serde_json::from_value(json!({"address": "0xabc", "page": 3})).unwrap();
        assert_eq!(params.page, Some(3));
    }

    #[test]
    fn schemas_mark_required_fields() {
        assert_eq!(AccountParameters::json_schema()["required"], json!(["address"]));
        assert_eq!(
            TransactionStatusParameters::json_schema()["required"],
            json!(["tx_id"])
        );
        assert_eq!(PagedAccountParameters::json_schema()["required"], json!(["address"]));
    }
}
