// src/plugins/token.rs
//
// VET and VIP-180 token operations: transfers, balances and registry
// lookups. Symbols resolve through the token registry; raw contract
// addresses are accepted everywhere and have their metadata read
// on-chain.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use ethers_core::abi::Token as AbiToken;
use ethers_core::types::{Address, U256};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::plugin::Plugin;
use crate::core::registration::ToolRegistration;
use crate::core::schema::ToolParameters;
use crate::core::types::{Chain, TransactionClause};
use crate::core::wallet::ContractReader;
use crate::plugins::{read_string, read_u256};
use crate::registry::abi;
use crate::registry::networks::Network;
use crate::registry::tokens::{resolve_token, ResolvedToken};
use crate::utils::{format_fixed, normalize_address, parse_token_amount};

#[derive(Debug, Deserialize)]
pub struct TransferVetParameters {
    pub to: String,
    pub amount: String,
    #[serde(default)]
    pub memo: Option<String>,
}

impl ToolParameters for TransferVetParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Recipient address"
                },
                "amount": {
                    "type": "string",
                    "description": "Amount of VET to transfer (e.g. \"1.5\")"
                },
                "memo": {
                    "type": "string",
                    "description": "Optional memo recorded in the clause data"
                }
            },
            "required": ["to", "amount"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferTokenParameters {
    pub token: String,
    pub to: String,
    pub amount: String,
}

impl ToolParameters for TransferTokenParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "Token symbol (e.g. \"VTHO\") or contract address"
                },
                "to": {
                    "type": "string",
                    "description": "Recipient address"
                },
                "amount": {
                    "type": "string",
                    "description": "Amount to transfer in token units (e.g. \"100\")"
                }
            },
            "required": ["token", "to", "amount"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenBalanceParameters {
    pub token: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl ToolParameters for TokenBalanceParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "Token symbol (e.g. \"VTHO\") or contract address"
                },
                "address": {
                    "type": "string",
                    "description": "Address to check; defaults to the wallet address"
                }
            },
            "required": ["token"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenInfoParameters {
    pub token: String,
}

impl ToolParameters for TokenInfoParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "token": {
                    "type": "string",
                    "description": "Token symbol (e.g. \"VTHO\") or contract address"
                }
            },
            "required": ["token"]
        })
    }
}

/// Tools for VET and VIP-180 tokens.
pub struct TokenPlugin<W: ContractReader> {
    registrations: Vec<ToolRegistration<W>>,
}

impl<W: ContractReader> TokenPlugin<W> {
    pub fn new(network: Network) -> Self {
        let registrations = vec![
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "transfer_vet",
                    "Transfer VET to another address",
                    move |wallet: Arc<W>, params: TransferVetParameters| {
                        transfer_vet(wallet, network.clone(), params)
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "transfer_token",
                    "Transfer a VIP-180 token to another address",
                    move |wallet: Arc<W>, params: TransferTokenParameters| {
                        transfer_token(wallet, network.clone(), params)
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "get_token_balance",
                    "Get the balance of a VIP-180 token for an address",
                    move |wallet: Arc<W>, params: TokenBalanceParameters| {
                        get_token_balance(wallet, network.clone(), params)
                    },
                )
            },
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "get_token_info",
                    "Get metadata about a token from the registry or its contract",
                    move |wallet: Arc<W>, params: TokenInfoParameters| {
                        get_token_info(wallet, network.clone(), params)
                    },
                )
            },
        ];
        Self { registrations }
    }
}

impl<W: ContractReader> Plugin<W> for TokenPlugin<W> {
    fn name(&self) -> &str {
        "token"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        chain.chain_type == "vechain"
    }

    fn registrations(&self) -> &[ToolRegistration<W>] {
        &self.registrations
    }
}

async fn transfer_vet<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: TransferVetParameters,
) -> Result<Value> {
    let to = normalize_address(&params.to)?;
    let amount_wei = parse_token_amount(&params.amount, 18)?;

    let mut clause = TransactionClause::vet_transfer(&to, amount_wei);
    if let Some(memo) = params.memo.as_deref().filter(|memo| !memo.is_empty()) {
        clause.data = format!("0x{}", hex::encode(memo.as_bytes()));
    }

    let result = wallet.send_transaction(vec![clause]).await?;
    let explorer = network.explorer_tx_url(&result.hash);
    Ok(json!({
        "success": true,
        "txHash": result.hash,
        "txId": result.id,
        "from": wallet.get_address(),
        "to": to,
        "amount": params.amount,
        "token": "VET",
        "explorer": explorer,
        "message": format!("Successfully transferred {} VET to {}", params.amount, to),
    }))
}

async fn transfer_token<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: TransferTokenParameters,
) -> Result<Value> {
    let to = normalize_address(&params.to)?;
    let token = resolve_token(&params.token, network.name)?;

    let clause = if token.native {
        let amount_wei = parse_token_amount(&params.amount, 18)?;
        TransactionClause::vet_transfer(&to, amount_wei)
    } else {
        let contract = deployed_address(&token, &network)?;
        let decimals = token_decimals(wallet.as_ref(), &token, &contract).await?;
        let amount = parse_token_amount(&params.amount, decimals)?;
        let recipient = Address::from_str(&to)?;
        let data = abi::encode_call(
            "transfer(address,uint256)",
            &[AbiToken::Address(recipient), AbiToken::Uint(amount)],
        );
        TransactionClause::contract_call(&contract, data)
    };

    let result = wallet.send_transaction(vec![clause]).await?;
    let explorer = network.explorer_tx_url(&result.hash);
    Ok(json!({
        "success": true,
        "txHash": result.hash,
        "txId": result.id,
        "from": wallet.get_address(),
        "to": to,
        "amount": params.amount,
        "token": token.symbol,
        "explorer": explorer,
        "message": format!(
            "Successfully transferred {} {} to {}",
            params.amount, token.symbol, to
        ),
    }))
}

async fn get_token_balance<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: TokenBalanceParameters,
) -> Result<Value> {
    let holder = match &params.address {
        Some(address) => normalize_address(address)?,
        None => wallet.get_address(),
    };
    let token = resolve_token(&params.token, network.name)?;

    if token.native {
        let balance = wallet.balance_of(&holder).await?;
        return Ok(json!({
            "token": "VET",
            "address": holder,
            "balance": balance.vet,
            "raw": balance.raw.vet,
            "decimals": 18,
        }));
    }

    let contract = deployed_address(&token, &network)?;
    let decimals = token_decimals(wallet.as_ref(), &token, &contract).await?;
    let owner = Address::from_str(&holder)?;
    let raw = read_u256(
        wallet.as_ref(),
        &contract,
        "balanceOf(address)",
        &[AbiToken::Address(owner)],
    )
    .await?;

    Ok(json!({
        "token": token.symbol,
        "contract": contract,
        "address": holder,
        "balance": format_fixed(raw, decimals, 4)?,
        "raw": raw.to_string(),
        "decimals": decimals,
    }))
}

async fn get_token_info<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: TokenInfoParameters,
) -> Result<Value> {
    let token = resolve_token(&params.token, network.name)?;

    // Raw addresses carry no registry metadata, so read it on-chain.
    if params.token.starts_with("0x") {
        let contract = deployed_address(&token, &network)?;
        let symbol = read_string(wallet.as_ref(), &contract, "symbol()", &[]).await?;
        let name = read_string(wallet.as_ref(), &contract, "name()", &[]).await?;
        let decimals = token_decimals(wallet.as_ref(), &token, &contract).await?;
        return Ok(json!({
            "symbol": symbol,
            "name": name,
            "decimals": decimals,
            "native": false,
            "address": contract,
            "network": network.name,
            "available": true,
        }));
    }

    Ok(json!({
        "symbol": token.symbol,
        "name": token.name,
        "decimals": token.decimals,
        "native": token.native,
        "address": token.address,
        "network": network.name,
        "available": token.native || token.address.is_some(),
    }))
}

fn deployed_address(token: &ResolvedToken, network: &Network) -> Result<String> {
    token.address.clone().ok_or_else(|| {
        anyhow!(
            "Token {} is not deployed on {}",
            token.symbol,
            network.display_name
        )
    })
}

/// Registry decimals when known, otherwise `decimals()` on-chain.
pub(crate) async fn token_decimals<W: ContractReader>(
    wallet: &W,
    token: &ResolvedToken,
    contract: &str,
) -> Result<u32> {
    if let Some(decimals) = token.decimals {
        return Ok(decimals);
    }
    let value = read_u256(wallet, contract, "decimals()", &[]).await?;
    if value > U256::from(77u64) {
        bail!("Token {} reports unreasonable decimals: {}", contract, value);
    }
    Ok(value.low_u32())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_mark_required_fields() {
        let schema = TransferVetParameters::json_schema();
        assert_eq!(schema["required"], json!(["to", "amount"]));
        assert!(schema["properties"]["memo"].is_object());

        let schema = TokenBalanceParameters::json_schema();
        assert_eq!(schema["required"], json!(["token"]));
    }

    #[test]
    fn optional_fields_deserialize_when_absent() {
        let params: TransferVetParameters =
            serde_json::from_value(json!({"to": "0xabc", "amount": "1"})).unwrap();
        assert!(params.memo.is_none());

        let params: TokenBalanceParameters =
            serde_json::from_value(json!({"token": "VTHO"})).unwrap();
        assert!(params.address.is_none());
    }
}
