// src/core/error.rs
use thiserror::Error;

/// Fatal problems detected while sealing a plugin's registrations or
/// aggregating the final tool list. Startup aborts on any of these.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin {plugin}: tool name {name:?} is not a valid snake_case identifier")]
    InvalidToolName { plugin: String, name: String },

    #[error("duplicate tool name {tool} (first registered by {first}, again by {second})")]
    DuplicateToolName {
        tool: String,
        first: String,
        second: String,
    },

    #[error("plugin {plugin}: tool {tool} has an invalid parameter schema: {message}")]
    InvalidSchema {
        plugin: String,
        tool: String,
        message: String,
    },
}

/// Per-invocation failures surfaced through the protocol adapter. Every
/// variant except `NotFound` carries the name of the tool that failed.
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Tool {0} not found")]
    NotFound(String),

    #[error("invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("could not deserialize arguments for tool {tool}: {source}")]
    Rehydration {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool execution failed: {tool}: {reason:#}")]
    Execution { tool: String, reason: anyhow::Error },
}
