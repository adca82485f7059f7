//! Shared fixtures: a stub wallet that records submitted transactions,
//! plus canned plugins exercising the registration paths.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers_core::abi::{encode, Token as AbiToken};
use ethers_core::types::U256;
use serde::Deserialize;
use serde_json::{json, Value};

use vechain_mcp_server::core::types::{
    Balance, Chain, RawBalance, Signature, TransactionClause, TransactionResult,
};
use vechain_mcp_server::core::{
    ContractReader, Plugin, ToolParameters, ToolRegistration, WalletClient,
};
use vechain_mcp_server::registry::networks::TESTNET;

pub const STUB_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Wallet double: fixed address and chain, canned balances, recorded
/// transaction submissions.
pub struct StubWallet {
    sent: Mutex<Vec<Vec<TransactionClause>>>,
}

impl StubWallet {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_transactions(&self) -> Vec<Vec<TransactionClause>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletClient for StubWallet {
    fn get_address(&self) -> String {
        STUB_ADDRESS.to_string()
    }

    fn get_chain(&self) -> Chain {
        TESTNET.chain()
    }

    async fn sign_message(&self, message: &str) -> Result<Signature> {
        Ok(Signature {
            signature: format!("0x{}", hex::encode(message.as_bytes())),
        })
    }

    async fn balance_of(&self, _address: &str) -> Result<Balance> {
        Ok(Balance {
            vet: "123.4500".to_string(),
            vtho: "67.8900".to_string(),
            raw: RawBalance {
                vet: "123450000000000000000".to_string(),
                vtho: "67890000000000000000".to_string(),
            },
        })
    }

    async fn send_transaction(
        &self,
        clauses: Vec<TransactionClause>,
    ) -> Result<TransactionResult> {
        self.sent.lock().unwrap().push(clauses);
        Ok(TransactionResult {
            hash: "0xstub".to_string(),
            id: "0xstub".to_string(),
        })
    }
}

#[async_trait]
impl ContractReader for StubWallet {
    async fn execute_call(&self, _to: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        // canned outputs keyed on the call selector
        match data.get(..4) {
            // decimals()
            Some([0x31, 0x3c, 0xe5, 0x67]) => {
                Ok(encode(&[AbiToken::Uint(U256::from(18u64))]))
            }
            // balanceOf(address)
            Some([0x70, 0xa0, 0x82, 0x31]) => Ok(encode(&[AbiToken::Uint(U256::exp10(18))])),
            _ => Err(anyhow!("unexpected contract call")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EchoParameters {
    pub text: String,
}

impl ToolParameters for EchoParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to echo back"
                }
            },
            "required": ["text"]
        })
    }
}

/// Plugin double with a configurable arena.
pub struct TestPlugin {
    name: String,
    supported: bool,
    registrations: Vec<ToolRegistration<StubWallet>>,
}

impl TestPlugin {
    pub fn new(name: &str, registrations: Vec<ToolRegistration<StubWallet>>) -> Self {
        Self {
            name: name.to_string(),
            supported: true,
            registrations,
        }
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }
}

impl Plugin<StubWallet> for TestPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        self.supported && chain.chain_type == "vechain"
    }

    fn registrations(&self) -> &[ToolRegistration<StubWallet>] {
        &self.registrations
    }
}

pub fn echo_registration(tool: &str) -> ToolRegistration<StubWallet> {
    ToolRegistration::plain(
        tool,
        "Echoes its input back",
        |params: EchoParameters| async move { Ok(json!({ "echo": params.text })) },
    )
}

pub fn counting_registration(
    tool: &str,
    counter: Arc<AtomicUsize>,
) -> ToolRegistration<StubWallet> {
    ToolRegistration::plain(tool, "Counts invocations", move |params: EchoParameters| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "echo": params.text }))
        }
    })
}

pub fn failing_registration(tool: &str) -> ToolRegistration<StubWallet> {
    ToolRegistration::plain(
        tool,
        "Always fails",
        |_params: EchoParameters| async move { Err::<Value, _>(anyhow!("disk on fire")) },
    )
}

pub fn wallet_echo_registration(tool: &str) -> ToolRegistration<StubWallet> {
    ToolRegistration::with_wallet(
        tool,
        "Echoes with the wallet address",
        |wallet: Arc<StubWallet>, params: EchoParameters| async move {
            Ok(json!({
                "address": wallet.get_address(),
                "echo": params.text,
            }))
        },
    )
}
