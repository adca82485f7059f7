// src/wallet/signer.rs
use anyhow::{anyhow, Context, Result};
use bip39::{Language, Mnemonic};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ethers_core::types::Address;
use ethers_core::utils::secret_key_to_address;
use ethers_signers::coins_bip39::English;
use ethers_signers::MnemonicBuilder;
use k256::ecdsa::SigningKey;

/// SLIP-44 coin type 818 (VET), first external child.
const VET_DERIVATION_PATH: &str = "m/44'/818'/0'/0/0";

type Blake2b256 = Blake2b<U32>;

/// Thor hashes with blake2b-256 rather than keccak.
pub fn blake2b256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Holds the secp256k1 key material and the address derived from it.
/// Sole owner of the key; nothing above this type sees raw key bytes.
pub struct WalletSigner {
    key: SigningKey,
    address: Address,
}

impl WalletSigner {
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let digits = private_key.trim().trim_start_matches("0x");
        let bytes = hex::decode(digits).context("Private key is not valid hex")?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|err| anyhow!("Invalid private key: {}", err))?;
        let address = secret_key_to_address(&key);
        Ok(Self { key, address })
    }

    /// BIP-39 phrase on the VET derivation path. The phrase is
    /// checksum-validated before derivation so typos fail with a
    /// mnemonic error instead of deriving a surprise address.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        Mnemonic::parse_in(Language::English, phrase)
            .map_err(|err| anyhow!("Invalid mnemonic phrase: {}", err))?;

        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(VET_DERIVATION_PATH)
            .context("Invalid derivation path")?
            .build()
            .map_err(|err| anyhow!("Failed to derive wallet from mnemonic: {}", err))?;

        let key = wallet.signer().clone();
        let address = secret_key_to_address(&key);
        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Lowercase 0x-prefixed hex address.
    pub fn address_hex(&self) -> String {
        format!("0x{:x}", self.address)
    }

    /// 65-byte recoverable signature (r || s || v) over a 32-byte digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; 65]> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|err| anyhow!("Signing failed: {}", err))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat's first development account
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn private_key_derives_known_address() {
        let signer = WalletSigner::from_private_key(DEV_KEY).unwrap();
        assert_eq!(signer.address_hex(), DEV_ADDRESS);

        // 0x prefix is optional
        let bare = WalletSigner::from_private_key(&DEV_KEY[2..]).unwrap();
        assert_eq!(bare.address_hex(), DEV_ADDRESS);
    }

    #[test]
    fn bad_key_material_is_rejected() {
        assert!(WalletSigner::from_private_key("0x1234").is_err());
        assert!(WalletSigner::from_private_key("not-hex-at-all").is_err());
        assert!(WalletSigner::from_mnemonic("not a real mnemonic phrase").is_err());
    }

    #[test]
    fn mnemonic_derivation_is_deterministic() {
        let phrase = "test test test test test test test test test test test junk";
        let first = WalletSigner::from_mnemonic(phrase).unwrap();
        let second = WalletSigner::from_mnemonic(phrase).unwrap();
        assert_eq!(first.address_hex(), second.address_hex());
        // VET path, not the Ethereum default path
        assert_ne!(first.address_hex(), DEV_ADDRESS);
    }

    #[test]
    fn blake2b256_known_vectors() {
        assert_eq!(
            hex::encode(blake2b256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
        assert_eq!(
            hex::encode(blake2b256(b"hello world")),
            "256c83b297114d201b30179f3f0ef0cace9783622da5974326b436178aeef610"
        );
    }

    #[test]
    fn signatures_are_sixty_five_bytes_with_low_recovery_id() {
        let signer = WalletSigner::from_private_key(DEV_KEY).unwrap();
        let digest = blake2b256(b"payload");
        let signature = signer.sign_digest(&digest).unwrap();
        assert!(signature[64] <= 1);

        // same digest, same signature (RFC 6979 deterministic nonces)
        let again = signer.sign_digest(&digest).unwrap();
        assert_eq!(signature, again);
    }
}
