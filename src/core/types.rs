// src/core/types.rs
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Describes the network a wallet is bound to. Plugins consult this
/// through `Plugin::supports_chain` before their tools are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    #[serde(rename = "type")]
    pub chain_type: String,
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// VET and VTHO balances, formatted for display plus raw wei strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub vet: String,
    pub vtho: String,
    pub raw: RawBalance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalance {
    pub vet: String,
    pub vtho: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub signature: String,
}

/// One clause of a Thor transaction. `to` is `None` for contract
/// deployment; `value` and `data` are 0x-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionClause {
    pub to: Option<String>,
    pub value: String,
    pub data: String,
}

impl TransactionClause {
    /// Plain value transfer carrying no calldata.
    pub fn vet_transfer(to: &str, amount_wei: U256) -> Self {
        Self {
            to: Some(to.to_string()),
            value: format!("0x{:x}", amount_wei),
            data: "0x".to_string(),
        }
    }

    /// Zero-value contract call.
    pub fn contract_call(to: &str, data: Vec<u8>) -> Self {
        Self::contract_call_with_value(to, data, U256::zero())
    }

    pub fn contract_call_with_value(to: &str, data: Vec<u8>, value_wei: U256) -> Self {
        Self {
            to: Some(to.to_string()),
            value: format!("0x{:x}", value_wei),
            data: format!("0x{}", hex::encode(data)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
    pub id: String,
}
