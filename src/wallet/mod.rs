// src/wallet/mod.rs
pub mod signer;
pub mod thor;
pub mod vechain;

pub use vechain::VeChainWallet;
