// src/wallet/vechain.rs
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ethers_core::types::Address;
use ethers_core::utils::rlp::RlpStream;
use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::types::{
    Balance, Chain, RawBalance, Signature, TransactionClause, TransactionResult,
};
use crate::core::wallet::{ContractReader, WalletClient};
use crate::registry::networks::Network;
use crate::utils::{format_fixed, parse_hex_u256};
use crate::wallet::signer::{blake2b256, WalletSigner};
use crate::wallet::thor::ThorClient;

// Thor intrinsic gas parameters.
const TX_GAS: u64 = 5_000;
const CLAUSE_GAS: u64 = 16_000;
const ZERO_BYTE_GAS: u64 = 4;
const NON_ZERO_BYTE_GAS: u64 = 68;
// Margin applied on top of simulated VM gas.
const VM_GAS_MARGIN_PERCENT: u64 = 20;

const TX_EXPIRATION_BLOCKS: u64 = 32;

/// A hot wallet bound to one Thor network. Implements the wallet
/// surface tools are built against, plus simulated contract reads for
/// the plugins.
pub struct VeChainWallet {
    signer: WalletSigner,
    thor: ThorClient,
    network: Network,
}

impl VeChainWallet {
    /// Builds a wallet from configuration. A mnemonic takes precedence
    /// over a bare private key when both are set.
    pub fn new(config: &Config, network: Network) -> Result<Self> {
        let signer = if let Some(mnemonic) = &config.wallet_mnemonic {
            WalletSigner::from_mnemonic(mnemonic)?
        } else if let Some(private_key) = &config.wallet_private_key {
            WalletSigner::from_private_key(private_key)?
        } else {
            bail!("Either WALLET_MNEMONIC or WALLET_PRIVATE_KEY must be configured");
        };

        let rpc_url = config
            .rpc_url_override
            .clone()
            .unwrap_or_else(|| network.rpc_url.to_string());
        let thor = ThorClient::new(&rpc_url);

        info!(
            "Wallet ready: {} on {}",
            signer.address_hex(),
            network.display_name
        );
        Ok(Self {
            signer,
            thor,
            network,
        })
    }

    /// Wallet with an explicit Thor endpoint, bypassing configuration.
    pub fn with_thor(signer: WalletSigner, thor: ThorClient, network: Network) -> Self {
        Self {
            signer,
            thor,
            network,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn thor(&self) -> &ThorClient {
        &self.thor
    }

    pub fn explorer_url(&self, tx_hash: &str) -> String {
        self.network.explorer_tx_url(tx_hash)
    }

    /// Gas charged before any VM execution happens.
    fn intrinsic_gas(clauses: &[TransactionClause]) -> Result<u64> {
        let mut gas = TX_GAS;
        for clause in clauses {
            gas += CLAUSE_GAS;
            let digits = clause.data.trim_start_matches("0x");
            if digits.is_empty() {
                continue;
            }
            let bytes = hex::decode(digits).context("Clause data is not valid hex")?;
            for byte in bytes {
                gas += if byte == 0 {
                    ZERO_BYTE_GAS
                } else {
                    NON_ZERO_BYTE_GAS
                };
            }
        }
        Ok(gas)
    }

    /// Intrinsic gas plus simulated VM gas with a safety margin. A
    /// reverting simulation aborts the send before anything is signed.
    async fn estimate_gas(&self, clauses: &[TransactionClause]) -> Result<u64> {
        let outputs = self
            .thor
            .simulate(clauses, &self.signer.address_hex())
            .await?;

        let mut vm_gas = 0u64;
        for output in &outputs {
            if output.reverted {
                let reason = if output.vm_error.is_empty() {
                    "unknown VM error"
                } else {
                    &output.vm_error
                };
                bail!("Transaction simulation reverted: {}", reason);
            }
            vm_gas += output.gas_used;
        }

        let intrinsic = Self::intrinsic_gas(clauses)?;
        let padded = vm_gas + vm_gas * VM_GAS_MARGIN_PERCENT / 100;
        Ok(intrinsic + padded)
    }

    /// RLP-encodes a transaction body in Thor's layout. With a
    /// signature the result is the raw submittable transaction;
    /// without, it is the preimage of the signing hash.
    fn encode_body(
        &self,
        block_ref: u64,
        nonce: u64,
        gas: u64,
        clauses: &[TransactionClause],
        signature: Option<&[u8; 65]>,
    ) -> Result<Vec<u8>> {
        let mut stream = RlpStream::new();
        stream.begin_list(if signature.is_some() { 10 } else { 9 });

        stream.append(&(self.network.chain_tag as u64));
        stream.append(&block_ref);
        stream.append(&TX_EXPIRATION_BLOCKS);

        stream.begin_list(clauses.len());
        for clause in clauses {
            stream.begin_list(3);
            match &clause.to {
                Some(to) => {
                    let address = Address::from_str(to)
                        .with_context(|| format!("Invalid clause recipient: {}", to))?;
                    stream.append(&address);
                }
                None => {
                    stream.append_empty_data();
                }
            }
            let value = parse_hex_u256(&clause.value)?;
            stream.append(&value);
            let data = hex::decode(clause.data.trim_start_matches("0x"))
                .context("Clause data is not valid hex")?;
            stream.append(&data);
        }

        stream.append(&0u64); // gasPriceCoef
        stream.append(&gas);
        stream.append_empty_data(); // dependsOn
        stream.append(&nonce);
        stream.begin_list(0); // reserved

        if let Some(signature) = signature {
            stream.append(&signature.to_vec());
        }

        Ok(stream.out().to_vec())
    }
}

/// First 8 bytes of a block id, the blockRef a transaction anchors to.
fn block_ref_from_id(block_id: &str) -> Result<u64> {
    let digits = block_id.trim_start_matches("0x");
    if digits.len() < 16 {
        bail!("Block id too short: {}", block_id);
    }
    u64::from_str_radix(&digits[..16], 16)
        .with_context(|| format!("Invalid block id: {}", block_id))
}

/// Thor transaction ids commit to both the body and the signer.
fn transaction_id(signing_hash: &[u8; 32], signer: &Address) -> String {
    let mut preimage = Vec::with_capacity(32 + 20);
    preimage.extend_from_slice(signing_hash);
    preimage.extend_from_slice(signer.as_bytes());
    format!("0x{}", hex::encode(blake2b256(&preimage)))
}

#[async_trait]
impl WalletClient for VeChainWallet {
    fn get_address(&self) -> String {
        self.signer.address_hex()
    }

    fn get_chain(&self) -> Chain {
        self.network.chain()
    }

    async fn sign_message(&self, message: &str) -> Result<Signature> {
        let digest = blake2b256(message.as_bytes());
        let signature = self.signer.sign_digest(&digest)?;
        Ok(Signature {
            signature: format!("0x{}", hex::encode(signature)),
        })
    }

    async fn balance_of(&self, address: &str) -> Result<Balance> {
        let account = self.thor.get_account(address).await?;
        let vet_wei = parse_hex_u256(&account.balance)?;
        let vtho_wei = parse_hex_u256(&account.energy)?;
        Ok(Balance {
            vet: format_fixed(vet_wei, 18, 4)?,
            vtho: format_fixed(vtho_wei, 18, 4)?,
            raw: RawBalance {
                vet: vet_wei.to_string(),
                vtho: vtho_wei.to_string(),
            },
        })
    }

    async fn send_transaction(
        &self,
        clauses: Vec<TransactionClause>,
    ) -> Result<TransactionResult> {
        if clauses.is_empty() {
            bail!("Transaction must contain at least one clause");
        }

        let best = self.thor.best_block().await?;
        let block_ref = block_ref_from_id(&best.id)?;
        let gas = self.estimate_gas(&clauses).await?;
        let nonce: u64 = rand::thread_rng().gen();

        let unsigned = self.encode_body(block_ref, nonce, gas, &clauses, None)?;
        let signing_hash = blake2b256(&unsigned);
        let signature = self.signer.sign_digest(&signing_hash)?;
        let raw = self.encode_body(block_ref, nonce, gas, &clauses, Some(&signature))?;

        let id = transaction_id(&signing_hash, &self.signer.address());
        debug!(
            "Submitting transaction {} ({} clauses, gas {})",
            id,
            clauses.len(),
            gas
        );

        let submitted = self.thor.submit_raw(&format!("0x{}", hex::encode(&raw))).await?;
        // Thor's id is authoritative; it matches the local computation
        // unless the node disagrees about the sender.
        let id = if submitted.id.is_empty() { id } else { submitted.id };
        Ok(TransactionResult {
            hash: id.clone(),
            id,
        })
    }
}

#[async_trait]
impl ContractReader for VeChainWallet {
    async fn execute_call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let clause = TransactionClause::contract_call(to, data);
        let outputs = self
            .thor
            .simulate(std::slice::from_ref(&clause), &self.signer.address_hex())
            .await?;
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("Thor simulation returned no outputs"))?;
        if output.reverted {
            let reason = if output.vm_error.is_empty() {
                "unknown VM error"
            } else {
                &output.vm_error
            };
            bail!("Contract call to {} reverted: {}", to, reason);
        }
        hex::decode(output.data.trim_start_matches("0x"))
            .context("Simulation output is not valid hex")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::U256;
    use ethers_core::utils::rlp::Rlp;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_wallet() -> VeChainWallet {
        VeChainWallet::with_thor(
            WalletSigner::from_private_key(DEV_KEY).unwrap(),
            ThorClient::new("http://localhost:8669"),
            crate::registry::networks::TESTNET,
        )
    }

    #[test]
    fn intrinsic_gas_counts_clauses_and_data_bytes() {
        let transfer = TransactionClause::vet_transfer(
            "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed",
            U256::from(1u64),
        );
        assert_eq!(
            VeChainWallet::intrinsic_gas(&[transfer.clone()]).unwrap(),
            21_000
        );
        assert_eq!(
            VeChainWallet::intrinsic_gas(&[transfer.clone(), transfer]).unwrap(),
            37_000
        );

        // one zero byte (4) and one non-zero byte (68)
        let with_data = TransactionClause::contract_call(
            "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed",
            vec![0x00, 0x01],
        );
        assert_eq!(
            VeChainWallet::intrinsic_gas(&[with_data]).unwrap(),
            21_072
        );
    }

    #[test]
    fn block_ref_is_the_first_eight_bytes() {
        let id = "0x014b3f4a0e1bc3f7d8f4c9908f43f1abad3b734fbbcbe156b0d2090baef5a65c";
        assert_eq!(block_ref_from_id(id).unwrap(), 0x014b3f4a0e1bc3f7);
        assert!(block_ref_from_id("0x1234").is_err());
    }

    #[test]
    fn unsigned_body_is_a_nine_item_list() {
        let wallet = test_wallet();
        let clauses = vec![TransactionClause::vet_transfer(
            "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed",
            U256::from(10_000u64),
        )];
        let encoded = wallet
            .encode_body(0x00000000aabbccddu64, 0xbc614e, 21_000, &clauses, None)
            .unwrap();

        let rlp = Rlp::new(&encoded);
        assert!(rlp.is_list());
        assert_eq!(rlp.item_count().unwrap(), 9);

        // chain tag, blockRef (leading zeros trimmed), expiration
        assert_eq!(rlp.val_at::<u64>(0).unwrap(), 0x27);
        assert_eq!(rlp.val_at::<u64>(1).unwrap(), 0xaabbccdd);
        assert_eq!(rlp.val_at::<u64>(2).unwrap(), 32);

        let clause_list = rlp.at(3).unwrap();
        assert_eq!(clause_list.item_count().unwrap(), 1);
        let clause = clause_list.at(0).unwrap();
        assert_eq!(
            clause.val_at::<Address>(0).unwrap(),
            Address::from_str("0x7567d83b7b8d80addcb281a71d54fc7b3364ffed").unwrap()
        );
        assert_eq!(clause.val_at::<U256>(1).unwrap(), U256::from(10_000u64));

        assert_eq!(rlp.val_at::<u64>(4).unwrap(), 0); // gasPriceCoef
        assert_eq!(rlp.val_at::<u64>(5).unwrap(), 21_000);
        assert_eq!(rlp.val_at::<u64>(7).unwrap(), 0xbc614e);
        assert_eq!(rlp.at(8).unwrap().item_count().unwrap(), 0); // reserved
    }

    #[test]
    fn signed_body_appends_the_signature() {
        let wallet = test_wallet();
        let clauses = vec![TransactionClause::vet_transfer(
            "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed",
            U256::from(10_000u64),
        )];
        let unsigned = wallet
            .encode_body(0xaabbccdd, 1, 21_000, &clauses, None)
            .unwrap();
        let signature = wallet
            .signer
            .sign_digest(&blake2b256(&unsigned))
            .unwrap();
        let signed = wallet
            .encode_body(0xaabbccdd, 1, 21_000, &clauses, Some(&signature))
            .unwrap();

        let rlp = Rlp::new(&signed);
        assert_eq!(rlp.item_count().unwrap(), 10);
        assert_eq!(rlp.val_at::<Vec<u8>>(9).unwrap(), signature.to_vec());
    }

    #[test]
    fn transaction_id_commits_to_signer() {
        let hash = blake2b256(b"body");
        let a = Address::from_str("0x7567d83b7b8d80addcb281a71d54fc7b3364ffed").unwrap();
        let b = Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        let id_a = transaction_id(&hash, &a);
        let id_b = transaction_id(&hash, &b);
        assert_ne!(id_a, id_b);
        assert!(id_a.starts_with("0x") && id_a.len() == 66);
    }
}
