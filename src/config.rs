// src/config.rs

use std::env;

use anyhow::{Context, Result};

/// All configuration, loaded once at startup from the environment
/// (optionally via a .env file).
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings, used only in HTTP mode
    pub host: String,
    pub port: u16,
    pub http_mode: bool,

    /// Network selection: "mainnet" or "testnet".
    pub network: String,
    /// Overrides the network's default Thor REST endpoint.
    pub rpc_url_override: Option<String>,

    // Wallet credentials; a mnemonic takes precedence over a private
    // key when both are set.
    pub wallet_mnemonic: Option<String>,
    pub wallet_private_key: Option<String>,

    // External services
    pub vechainstats_api_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid number")?,
            http_mode: matches!(env::var("HTTP_MODE").as_deref(), Ok("1") | Ok("true")),
            network: env::var("VECHAIN_NETWORK").unwrap_or_else(|_| "testnet".to_string()),
            rpc_url_override: non_empty(env::var("VECHAIN_RPC_URL")),
            wallet_mnemonic: non_empty(env::var("WALLET_MNEMONIC")),
            wallet_private_key: non_empty(env::var("WALLET_PRIVATE_KEY")),
            vechainstats_api_key: non_empty(env::var("VECHAINSTATS_API_KEY")),
        })
    }
}

/// Unset and blank environment variables both read as absent.
fn non_empty(value: std::result::Result<String, env::VarError>) -> Option<String> {
    value
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
