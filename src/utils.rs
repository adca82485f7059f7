// src/utils.rs
use anyhow::{anyhow, bail, Context, Result};
use ethers_core::types::U256;
use ethers_core::utils::{format_units, parse_units, ParseUnits};

/// Tool names are snake_case: a lowercase letter followed by lowercase
/// alphanumerics and underscores.
pub fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validates a 0x-prefixed 20-byte address and returns it lowercased.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("Address must start with 0x: {}", trimmed))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid VeChain address: {}", trimmed);
    }
    Ok(trimmed.to_lowercase())
}

/// Parses a 0x-prefixed hex quantity such as Thor's balance fields.
pub fn parse_hex_u256(value: &str) -> Result<U256> {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).with_context(|| format!("Invalid hex quantity: {}", value))
}

/// Parses a human decimal amount ("1.5") into base units without going
/// through floating point.
pub fn parse_token_amount(amount: &str, decimals: u32) -> Result<U256> {
    let parsed =
        parse_units(amount, decimals).with_context(|| format!("Invalid amount: {}", amount))?;
    match parsed {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("Amount must not be negative: {}", amount),
    }
}

/// Formats a base-unit quantity with a fixed number of decimal places,
/// truncating (not rounding) the fraction.
pub fn format_fixed(value: U256, decimals: u32, places: usize) -> Result<String> {
    let formatted = format_units(value, decimals)
        .with_context(|| format!("Could not format amount with {} decimals", decimals))?;
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let mut fraction = fraction.to_string();
            fraction.truncate(places);
            while fraction.len() < places {
                fraction.push('0');
            }
            Ok(format!("{}.{}", whole, fraction))
        }
        None => Ok(formatted),
    }
}
