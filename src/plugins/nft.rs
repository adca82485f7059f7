// src/plugins/nft.rs
//
// VIP-181 (ERC-721 compatible) collection queries and transfers.
// Collection metadata reads are tolerant: contracts that omit name,
// symbol or totalSupply report null instead of failing the call.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ethers_core::abi::Token as AbiToken;
use ethers_core::types::{Address, U256};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::plugin::Plugin;
use crate::core::registration::ToolRegistration;
use crate::core::schema::ToolParameters;
use crate::core::types::{Chain, TransactionClause};
use crate::core::wallet::ContractReader;
use crate::plugins::{read_address, read_string, read_u256};
use crate::registry::abi;
use crate::registry::networks::Network;
use crate::utils::normalize_address;

#[derive(Debug, Deserialize)]
pub struct CollectionParameters {
    pub contract_address: String,
}

impl ToolParameters for CollectionParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "contract_address": {
                    "type": "string",
                    "description": "NFT collection contract address"
                }
            },
            "required": ["contract_address"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MetadataParameters {
    pub contract_address: String,
    pub token_id: String,
}

impl ToolParameters for MetadataParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "contract_address": {
                    "type": "string",
                    "description": "NFT collection contract address"
                },
                "token_id": {
                    "type": "string",
                    "description": "Token id (decimal)"
                }
            },
            "required": ["contract_address", "token_id"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnershipParameters {
    pub contract_address: String,
    pub token_id: String,
    pub address: String,
}

impl ToolParameters for OwnershipParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "contract_address": {
                    "type": "string",
                    "description": "NFT collection contract address"
                },
                "token_id": {
                    "type": "string",
                    "description": "Token id (decimal)"
                },
                "address": {
                    "type": "string",
                    "description": "Address to check ownership for"
                }
            },
            "required": ["contract_address", "token_id", "address"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct NftTransferParameters {
    pub contract_address: String,
    pub to: String,
    pub token_id: String,
}

impl ToolParameters for NftTransferParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "contract_address": {
                    "type": "string",
                    "description": "NFT collection contract address"
                },
                "to": {
                    "type": "string",
                    "description": "Recipient address"
                },
                "token_id": {
                    "type": "string",
                    "description": "Token id (decimal)"
                }
            },
            "required": ["contract_address", "to", "token_id"]
        })
    }
}

/// Tools for VIP-181 NFT collections.
pub struct NftPlugin<W: ContractReader> {
    registrations: Vec<ToolRegistration<W>>,
}

impl<W: ContractReader> NftPlugin<W> {
    pub fn new(network: Network) -> Self {
        let registrations = vec![
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "nft_get_collection_info",
                    "Get name, symbol and supply of an NFT collection",
                    move |wallet: Arc<W>, params: CollectionParameters| {
                        get_collection_info(wallet, network.clone(), params)
                    },
                )
            },
            ToolRegistration::with_wallet(
                "nft_get_metadata",
                "Get the token URI and owner of an NFT",
                |wallet: Arc<W>, params: MetadataParameters| get_metadata(wallet, params),
            ),
            ToolRegistration::with_wallet(
                "nft_check_ownership",
                "Check whether an address owns a specific NFT",
                |wallet: Arc<W>, params: OwnershipParameters| check_ownership(wallet, params),
            ),
            {
                let network = network.clone();
                ToolRegistration::with_wallet(
                    "nft_transfer",
                    "Transfer an NFT owned by the wallet to another address",
                    move |wallet: Arc<W>, params: NftTransferParameters| {
                        transfer_nft(wallet, network.clone(), params)
                    },
                )
            },
        ];
        Self { registrations }
    }
}

impl<W: ContractReader> Plugin<W> for NftPlugin<W> {
    fn name(&self) -> &str {
        "nft"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        chain.chain_type == "vechain"
    }

    fn registrations(&self) -> &[ToolRegistration<W>] {
        &self.registrations
    }
}

async fn get_collection_info<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: CollectionParameters,
) -> Result<Value> {
    let contract = normalize_address(&params.contract_address)?;

    let name = read_string(wallet.as_ref(), &contract, "name()", &[]).await.ok();
    let symbol = read_string(wallet.as_ref(), &contract, "symbol()", &[])
        .await
        .ok();
    let total_supply = read_u256(wallet.as_ref(), &contract, "totalSupply()", &[])
        .await
        .ok()
        .map(|supply| supply.to_string());

    if name.is_none() && symbol.is_none() && total_supply.is_none() {
        bail!("No VIP-181 metadata readable at {}", contract);
    }

    Ok(json!({
        "contract": contract,
        "name": name,
        "symbol": symbol,
        "totalSupply": total_supply,
        "network": network.name,
    }))
}

async fn get_metadata<W: ContractReader>(
    wallet: Arc<W>,
    params: MetadataParameters,
) -> Result<Value> {
    let contract = normalize_address(&params.contract_address)?;
    let token_id = parse_token_id(&params.token_id)?;

    let owner = read_address(
        wallet.as_ref(),
        &contract,
        "ownerOf(uint256)",
        &[AbiToken::Uint(token_id)],
    )
    .await?;
    let token_uri = read_string(
        wallet.as_ref(),
        &contract,
        "tokenURI(uint256)",
        &[AbiToken::Uint(token_id)],
    )
    .await
    .ok();

    Ok(json!({
        "contract": contract,
        "tokenId": params.token_id,
        "owner": format!("0x{:x}", owner),
        "tokenURI": token_uri,
    }))
}

async fn check_ownership<W: ContractReader>(
    wallet: Arc<W>,
    params: OwnershipParameters,
) -> Result<Value> {
    let contract = normalize_address(&params.contract_address)?;
    let address = normalize_address(&params.address)?;
    let token_id = parse_token_id(&params.token_id)?;

    let owner = read_address(
        wallet.as_ref(),
        &contract,
        "ownerOf(uint256)",
        &[AbiToken::Uint(token_id)],
    )
    .await?;
    let owner_hex = format!("0x{:x}", owner);

    Ok(json!({
        "contract": contract,
        "tokenId": params.token_id,
        "address": address,
        "owner": owner_hex,
        "isOwner": owner_hex == address,
    }))
}

async fn transfer_nft<W: ContractReader>(
    wallet: Arc<W>,
    network: Network,
    params: NftTransferParameters,
) -> Result<Value> {
    let contract = normalize_address(&params.contract_address)?;
    let to = normalize_address(&params.to)?;
    let token_id = parse_token_id(&params.token_id)?;
    let from = wallet.get_address();

    let owner = read_address(
        wallet.as_ref(),
        &contract,
        "ownerOf(uint256)",
        &[AbiToken::Uint(token_id)],
    )
    .await?;
    if format!("0x{:x}", owner) != from.to_lowercase() {
        bail!(
            "Wallet {} does not own token {} of {}",
            from,
            params.token_id,
            contract
        );
    }

    let data = abi::encode_call(
        "transferFrom(address,address,uint256)",
        &[
            AbiToken::Address(Address::from_str(&from)?),
            AbiToken::Address(Address::from_str(&to)?),
            AbiToken::Uint(token_id),
        ],
    );
    let clause = TransactionClause::contract_call(&contract, data);

    let result = wallet.send_transaction(vec![clause]).await?;
    let explorer = network.explorer_tx_url(&result.hash);
    Ok(json!({
        "success": true,
        "txHash": result.hash,
        "txId": result.id,
        "transfer": {
            "contract": contract,
            "tokenId": params.token_id,
            "from": from,
            "to": to,
        },
        "explorer": explorer,
        "message": format!("NFT #{} transferred to {}", params.token_id, to),
    }))
}

fn parse_token_id(token_id: &str) -> Result<U256> {
    let trimmed = token_id.trim();
    if trimmed.is_empty() {
        bail!("Invalid token id: {:?}", token_id);
    }
    U256::from_dec_str(trimmed).with_context(|| format!("Invalid token id: {}", token_id))
}
