// src/plugins/mod.rs
pub mod dex;
pub mod nft;
pub mod token;
pub mod vechainstats;

pub use dex::DexPlugin;
pub use nft::NftPlugin;
pub use token::TokenPlugin;
pub use vechainstats::VeChainStatsPlugin;

use anyhow::Result;
use ethers_core::abi::Token as AbiToken;
use ethers_core::types::{Address, U256};

use crate::core::wallet::ContractReader;
use crate::registry::abi;

// Simulated single-call reads shared by the on-chain plugins.

pub(crate) async fn read_u256<W: ContractReader>(
    wallet: &W,
    contract: &str,
    signature: &str,
    args: &[AbiToken],
) -> Result<U256> {
    let output = wallet
        .execute_call(contract, abi::encode_call(signature, args))
        .await?;
    abi::decode_u256(&output)
}

pub(crate) async fn read_address<W: ContractReader>(
    wallet: &W,
    contract: &str,
    signature: &str,
    args: &[AbiToken],
) -> Result<Address> {
    let output = wallet
        .execute_call(contract, abi::encode_call(signature, args))
        .await?;
    abi::decode_address(&output)
}

pub(crate) async fn read_string<W: ContractReader>(
    wallet: &W,
    contract: &str,
    signature: &str,
    args: &[AbiToken],
) -> Result<String> {
    let output = wallet
        .execute_call(contract, abi::encode_call(signature, args))
        .await?;
    abi::decode_string(&output)
}
