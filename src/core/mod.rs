// src/core/mod.rs
pub mod aggregator;
pub mod error;
pub mod plugin;
pub mod registration;
pub mod schema;
pub mod tool;
pub mod types;
pub mod wallet;

pub use aggregator::aggregate_tools;
pub use error::{RegistryError, ToolCallError};
pub use plugin::Plugin;
pub use registration::{ToolHandler, ToolRegistration};
pub use schema::{NoParameters, ParameterSchema, ToolParameters};
pub use tool::ToolDescriptor;
pub use wallet::{ContractReader, WalletClient};
