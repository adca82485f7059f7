// src/core/wallet.rs
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::error::RegistryError;
use crate::core::registration::{validate_registrations, ToolRegistration};
use crate::core::schema::{NoParameters, ToolParameters};
use crate::core::tool::ToolDescriptor;
use crate::core::types::{Balance, Chain, Signature, TransactionClause, TransactionResult};

/// Origin label for the always-present wallet tools, used in duplicate
/// diagnostics alongside plugin names.
pub const CORE_ORIGIN: &str = "core";

/// The minimum operational surface every concrete wallet provides.
/// Bound tools close over exactly one `Arc<W>` at aggregation time.
#[async_trait]
pub trait WalletClient: Send + Sync + 'static {
    fn get_address(&self) -> String;

    fn get_chain(&self) -> Chain;

    async fn sign_message(&self, message: &str) -> Result<Signature>;

    async fn balance_of(&self, address: &str) -> Result<Balance>;

    async fn send_transaction(
        &self,
        clauses: Vec<TransactionClause>,
    ) -> Result<TransactionResult>;
}

/// Read-only contract access for wallets that can simulate calls.
/// Plugins that decode on-chain state bound on this instead of a
/// concrete wallet type, which keeps them testable against stubs.
#[async_trait]
pub trait ContractReader: WalletClient {
    /// Simulates a zero-value call and returns the raw output bytes.
    /// Reverted simulations are errors.
    async fn execute_call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
pub struct BalanceParameters {
    pub address: String,
}

impl ToolParameters for BalanceParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "VeChain address to check balance for"
                }
            },
            "required": ["address"]
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SignMessageParameters {
    pub message: String,
}

impl ToolParameters for SignMessageParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Message to sign"
                }
            },
            "required": ["message"]
        })
    }
}

/// Binds the four tools every wallet carries. These appear in the
/// aggregated list even when no plugin is configured, always in this
/// order.
pub fn core_tools<W: WalletClient>(wallet: &Arc<W>) -> Result<Vec<ToolDescriptor>, RegistryError> {
    let registrations = core_registrations::<W>();
    validate_registrations(CORE_ORIGIN, &registrations)?;

    let mut tools = Vec::with_capacity(registrations.len());
    for registration in &registrations {
        tools.push(registration.bind(CORE_ORIGIN, wallet)?);
    }
    Ok(tools)
}

fn core_registrations<W: WalletClient>() -> Vec<ToolRegistration<W>> {
    vec![
        ToolRegistration::with_wallet(
            "get_wallet_address",
            "Get the wallet address",
            |wallet: Arc<W>, _params: NoParameters| async move {
                Ok(json!({
                    "address": wallet.get_address(),
                    "chain": wallet.get_chain().name,
                }))
            },
        ),
        ToolRegistration::with_wallet(
            "get_chain_info",
            "Get information about the current chain",
            |wallet: Arc<W>, _params: NoParameters| async move {
                anyhow::Ok(wallet.get_chain())
            },
        ),
        ToolRegistration::with_wallet(
            "get_balance",
            "Get VET and VTHO balance for an address",
            |wallet: Arc<W>, params: BalanceParameters| async move {
                wallet.balance_of(&params.address).await
            },
        ),
        ToolRegistration::with_wallet(
            "sign_message",
            "Sign a message with the wallet's private key",
            |wallet: Arc<W>, params: SignMessageParameters| async move {
                wallet.sign_message(&params.message).await
            },
        ),
    ]
}
