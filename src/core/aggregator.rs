// src/core/aggregator.rs
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::error::RegistryError;
use crate::core::plugin::Plugin;
use crate::core::tool::ToolDescriptor;
use crate::core::wallet::{core_tools, WalletClient, CORE_ORIGIN};

/// Produces the final dispatch-ready tool list: core wallet tools
/// first, then every compatible plugin's tools in declaration order.
///
/// Chain-incompatible plugins and empty arenas are skipped with a
/// warning. A public name appearing twice anywhere in the list is a
/// fatal error naming both origins; core tools are bound first and so
/// can never be shadowed.
pub fn aggregate_tools<W: WalletClient>(
    wallet: &Arc<W>,
    plugins: &[Box<dyn Plugin<W>>],
) -> Result<Vec<ToolDescriptor>, RegistryError> {
    let chain = wallet.get_chain();

    let mut tools = core_tools(wallet)?;
    let mut origins: HashMap<String, String> = tools
        .iter()
        .map(|tool| (tool.name().to_string(), CORE_ORIGIN.to_string()))
        .collect();

    for plugin in plugins {
        if !plugin.supports_chain(&chain) {
            warn!(
                plugin = plugin.name(),
                chain = %chain.name,
                "plugin does not support the active chain, skipping"
            );
            continue;
        }

        let bound = plugin.tools(wallet)?;
        if bound.is_empty() {
            warn!(plugin = plugin.name(), "plugin registered no tools, skipping");
            continue;
        }

        debug!(plugin = plugin.name(), tools = bound.len(), "plugin tools bound");
        for tool in bound {
            if let Some(first) = origins.get(tool.name()) {
                return Err(RegistryError::DuplicateToolName {
                    tool: tool.name().to_string(),
                    first: first.clone(),
                    second: plugin.name().to_string(),
                });
            }
            origins.insert(tool.name().to_string(), plugin.name().to_string());
            tools.push(tool);
        }
    }

    Ok(tools)
}
