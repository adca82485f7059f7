// src/registry/networks.rs
use anyhow::{anyhow, Result};

use crate::core::types::{Chain, NativeCurrency};

/// A VeChain Thor network definition. Chain ids follow the convention
/// used by VeChain tooling (100009 mainnet, 100010 testnet); the chain
/// tag is the single byte committed into every signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: &'static str,
    pub display_name: &'static str,
    pub chain_id: u64,
    pub chain_tag: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

pub const MAINNET: Network = Network {
    name: "mainnet",
    display_name: "VeChain",
    chain_id: 100009,
    chain_tag: 0x4a,
    rpc_url: "https://mainnet.vechain.org",
    explorer_url: "https://explore.vechain.org",
};

pub const TESTNET: Network = Network {
    name: "testnet",
    display_name: "VeChain Testnet",
    chain_id: 100010,
    chain_tag: 0x27,
    rpc_url: "https://testnet.vechain.org",
    explorer_url: "https://explore-testnet.vechain.org",
};

impl Network {
    /// Chain descriptor used for plugin gating and `get_chain_info`.
    pub fn chain(&self) -> Chain {
        Chain {
            chain_type: "vechain".to_string(),
            id: self.chain_id,
            name: self.display_name.to_string(),
            native_currency: NativeCurrency {
                name: "VeChain".to_string(),
                symbol: "VET".to_string(),
                decimals: 18,
            },
        }
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/transactions/{}", self.explorer_url, tx_hash)
    }
}

pub fn get_network(name: &str) -> Result<Network> {
    match name.to_lowercase().as_str() {
        "mainnet" | "main" => Ok(MAINNET),
        "testnet" | "test" => Ok(TESTNET),
        other => Err(anyhow!(
            "Unknown network {:?}, expected \"mainnet\" or \"testnet\"",
            other
        )),
    }
}
