// src/core/plugin.rs
use std::sync::Arc;

use crate::core::error::RegistryError;
use crate::core::registration::{validate_registrations, ToolRegistration};
use crate::core::tool::ToolDescriptor;
use crate::core::types::Chain;
use crate::core::wallet::WalletClient;

/// A named bundle of tool registrations gated by chain compatibility.
///
/// Implementations own their registration arena, built once in the
/// constructor. `tools` is idempotent: repeated calls yield descriptors
/// with identical names, descriptions and schema documents (the execute
/// closures are fresh each call).
pub trait Plugin<W: WalletClient>: Send + Sync {
    fn name(&self) -> &str;

    /// Consulted by the aggregator only; binding itself never looks at
    /// the chain.
    fn supports_chain(&self, chain: &Chain) -> bool;

    fn registrations(&self) -> &[ToolRegistration<W>];

    /// Seals the arena and binds every registration to the wallet.
    fn tools(&self, wallet: &Arc<W>) -> Result<Vec<ToolDescriptor>, RegistryError> {
        let registrations = self.registrations();
        validate_registrations(self.name(), registrations)?;

        let mut tools = Vec::with_capacity(registrations.len());
        for registration in registrations {
            tools.push(registration.bind(self.name(), wallet)?);
        }
        Ok(tools)
    }
}
