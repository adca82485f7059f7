#![recursion_limit = "256"]
// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers_core::types::{Address, H256, U256};

pub mod config;
pub mod core;
pub mod mcp;
pub mod plugins;
pub mod registry;
pub mod utils;
pub mod wallet;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Aggregated tool set served over MCP
    pub adapter: Arc<mcp::McpToolAdapter>,
}
