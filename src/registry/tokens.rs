// src/registry/tokens.rs
use anyhow::{anyhow, Result};

/// VTHO (energy) lives at a fixed address on every Thor network.
pub const VTHO_ADDRESS: &str = "0x0000000000000000000000000000456e65726779";

/// A token known to the server, with per-network deployments. Symbols
/// without an address on the active network resolve as unavailable
/// rather than silently pointing at the wrong contract.
#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u32,
    pub native: bool,
    pub mainnet_address: Option<&'static str>,
    pub testnet_address: Option<&'static str>,
}

impl TokenEntry {
    pub fn address_on(&self, network: &str) -> Option<&'static str> {
        match network {
            "mainnet" => self.mainnet_address,
            "testnet" => self.testnet_address,
            _ => None,
        }
    }
}

pub const VECHAIN_TOKENS: &[TokenEntry] = &[
    TokenEntry {
        symbol: "VET",
        name: "VeChain",
        decimals: 18,
        native: true,
        mainnet_address: None,
        testnet_address: None,
    },
    TokenEntry {
        symbol: "VTHO",
        name: "VeThor",
        decimals: 18,
        native: false,
        mainnet_address: Some(VTHO_ADDRESS),
        testnet_address: Some(VTHO_ADDRESS),
    },
    TokenEntry {
        symbol: "B3TR",
        name: "VeBetter",
        decimals: 18,
        native: false,
        mainnet_address: None,
        testnet_address: Some("0xbf64cf86894ee0877c4e7d03936e35ee8d8b864f"),
    },
    TokenEntry {
        symbol: "USDT",
        name: "Tether USD",
        decimals: 6,
        native: false,
        mainnet_address: Some("0x0b7007c13325c48911f73a2dad5fa5dcbf808adc"),
        testnet_address: None,
    },
    TokenEntry {
        symbol: "USDC",
        name: "USD Coin",
        decimals: 6,
        native: false,
        mainnet_address: Some("0x8ac7230489e1b5495d3a8cf9add9333b5623814b"),
        testnet_address: None,
    },
    TokenEntry {
        symbol: "VEUSD",
        name: "VeUSD",
        decimals: 18,
        native: false,
        mainnet_address: Some("0xe97c7b4b6d6f11bc4065ca3b9f7e8b8eef913b20"),
        testnet_address: None,
    },
    TokenEntry {
        symbol: "WOV",
        name: "World of V",
        decimals: 18,
        native: false,
        mainnet_address: Some("0x8e2b8b65e16a0bf4a1de16e4f3e2a8c1c4d91f3e"),
        testnet_address: None,
    },
    TokenEntry {
        symbol: "SHA",
        name: "Safe Haven",
        decimals: 18,
        native: false,
        mainnet_address: Some("0x0e06ae6fd56a9c3c0f94e8a9e8d7a8d7e8a9d91f"),
        testnet_address: None,
    },
    TokenEntry {
        symbol: "DBET",
        name: "DecentBet",
        decimals: 18,
        native: false,
        mainnet_address: Some("0x1b8ec6c2a45cca481da6f243df0d7a5744afc1f8"),
        testnet_address: None,
    },
];

/// A token resolved for one network: registry metadata, or a bare
/// contract address the caller supplied directly.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub symbol: String,
    pub name: String,
    pub decimals: Option<u32>,
    pub native: bool,
    pub address: Option<String>,
}

pub fn get_token(symbol: &str, network: &str) -> Result<&'static TokenEntry> {
    let wanted = symbol.to_uppercase();
    VECHAIN_TOKENS
        .iter()
        .find(|token| token.symbol == wanted)
        .ok_or_else(|| anyhow!("Token {} not found in registry for {}", symbol, network))
}

/// Accepts a registry symbol or a raw 0x contract address. Raw
/// addresses come back with no decimals; callers read `decimals()`
/// on-chain in that case.
pub fn resolve_token(token: &str, network: &str) -> Result<ResolvedToken> {
    if token.starts_with("0x") {
        let address = crate::utils::normalize_address(token)?;
        return Ok(ResolvedToken {
            symbol: format!("TOKEN_{}", &address[..8]),
            name: address.clone(),
            decimals: None,
            native: false,
            address: Some(address),
        });
    }

    let entry = get_token(token, network)?;
    Ok(ResolvedToken {
        symbol: entry.symbol.to_string(),
        name: entry.name.to_string(),
        decimals: Some(entry.decimals),
        native: entry.native,
        address: entry.address_on(network).map(str::to_string),
    })
}

/// Tokens usable on the given network (native, or deployed there).
pub fn tokens_on(network: &str) -> Vec<&'static TokenEntry> {
    VECHAIN_TOKENS
        .iter()
        .filter(|token| token.native || token.address_on(network).is_some())
        .collect()
}
