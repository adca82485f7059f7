// src/registry/abi.rs
//
// Minimal ABI plumbing for the handful of VIP-180/VIP-181 and
// UniswapV2-style calls the plugins make. Everything rides on
// ethers-core's abi codecs; no contract bindings are generated.

use anyhow::{anyhow, Result};
use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, U256};
use ethers_core::utils::keccak256;

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash[0..4]);
    sel
}

/// Selector plus ABI-encoded arguments, ready for a clause data field.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode(args));
    data
}

pub fn decode_u256(data: &[u8]) -> Result<U256> {
    let tokens = decode(&[ParamType::Uint(256)], data)
        .map_err(|err| anyhow!("Could not decode uint256: {}", err))?;
    match tokens.first() {
        Some(Token::Uint(value)) => Ok(*value),
        _ => Err(anyhow!("Contract output is not a uint256")),
    }
}

pub fn decode_address(data: &[u8]) -> Result<Address> {
    let tokens = decode(&[ParamType::Address], data)
        .map_err(|err| anyhow!("Could not decode address: {}", err))?;
    match tokens.first() {
        Some(Token::Address(value)) => Ok(*value),
        _ => Err(anyhow!("Contract output is not an address")),
    }
}

/// Decodes a string return value. Some older contracts return names
/// and symbols as bytes32, so that layout is tried second.
pub fn decode_string(data: &[u8]) -> Result<String> {
    if let Ok(tokens) = decode(&[ParamType::String], data) {
        if let Some(Token::String(value)) = tokens.into_iter().next() {
            return Ok(value);
        }
    }

    if let Ok(tokens) = decode(&[ParamType::FixedBytes(32)], data) {
        if let Some(Token::FixedBytes(bytes)) = tokens.into_iter().next() {
            let trimmed: Vec<u8> = bytes.into_iter().take_while(|b| *b != 0).collect();
            if let Ok(value) = String::from_utf8(trimmed) {
                return Ok(value);
            }
        }
    }

    Err(anyhow!("Contract output is not a decodable string"))
}

/// Decodes the `getReserves()` triple of a UniswapV2-style pair,
/// dropping the timestamp.
pub fn decode_reserves(data: &[u8]) -> Result<(U256, U256)> {
    let tokens = decode(
        &[
            ParamType::Uint(112),
            ParamType::Uint(112),
            ParamType::Uint(32),
        ],
        data,
    )
    .map_err(|err| anyhow!("Could not decode reserves: {}", err))?;
    match (tokens.first(), tokens.get(1)) {
        (Some(Token::Uint(reserve0)), Some(Token::Uint(reserve1))) => Ok((*reserve0, *reserve1)),
        _ => Err(anyhow!("Pair output is not a reserve triple")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transfer_selector_matches_known_value() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn encode_call_lays_out_selector_then_words() {
        let to = Address::from_str("0x0000000000000000000000000000456e65726779").unwrap();
        let data = encode_call(
            "transfer(address,uint256)",
            &[Token::Address(to), Token::Uint(U256::from(1000u64))],
        );
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[0..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        // address is right-aligned in its word
        assert_eq!(&data[16..36], to.as_bytes());
        assert_eq!(data[67], 0xe8);
    }

    #[test]
    fn u256_round_trip() {
        let encoded = encode(&[Token::Uint(U256::from(42u64))]);
        assert_eq!(decode_u256(&encoded).unwrap(), U256::from(42u64));
    }

    #[test]
    fn string_decoding_handles_bytes32_contracts() {
        let dynamic = encode(&[Token::String("VeThor".to_string())]);
        assert_eq!(decode_string(&dynamic).unwrap(), "VeThor");

        let mut fixed = [0u8; 32];
        fixed[..4].copy_from_slice(b"VTHO");
        let legacy = encode(&[Token::FixedBytes(fixed.to_vec())]);
        assert_eq!(decode_string(&legacy).unwrap(), "VTHO");
    }

    #[test]
    fn reserve_decoding_drops_the_timestamp() {
        let encoded = encode(&[
            Token::Uint(U256::from(1000u64)),
            Token::Uint(U256::from(2000u64)),
            Token::Uint(U256::from(1_700_000_000u64)),
        ]);
        let (r0, r1) = decode_reserves(&encoded).unwrap();
        assert_eq!(r0, U256::from(1000u64));
        assert_eq!(r1, U256::from(2000u64));
    }
}
