// src/mcp/mod.rs
pub mod adapter;
pub mod handler;
pub mod protocol;

pub use adapter::McpToolAdapter;
