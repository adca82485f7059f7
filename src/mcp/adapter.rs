// src/mcp/adapter.rs
use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::core::error::ToolCallError;
use crate::core::tool::ToolDescriptor;
use crate::mcp::protocol::{ToolCallResult, ToolInfo};

/// Serves the aggregated tool list to the outer protocol: enumerate
/// for `tools/list` and invoke-by-name for `tools/call`. Names are
/// unique by the time descriptors arrive here (the aggregator enforces
/// it), so the index is a plain name-to-position map.
pub struct McpToolAdapter {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl McpToolAdapter {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        let index = tools
            .iter()
            .enumerate()
            .map(|(position, tool)| (tool.name().to_string(), position))
            .collect();
        Self { tools, index }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Projects the descriptors in aggregation order.
    pub fn list(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.schema().document().clone(),
            })
            .collect()
    }

    /// Looks a tool up by exact name, validates the raw arguments
    /// against its schema, executes, and wraps the pretty-printed
    /// result in a single text content item. Validation runs before
    /// the handler; a failing check means the handler never executes.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, ToolCallError> {
        let tool = self
            .index
            .get(name)
            .map(|&position| &self.tools[position])
            .ok_or_else(|| ToolCallError::NotFound(name.to_string()))?;

        let args = arguments.unwrap_or_else(|| json!({}));
        tool.schema()
            .check(&args)
            .map_err(|message| ToolCallError::InvalidArguments {
                tool: name.to_string(),
                message,
            })?;

        debug!(tool = name, "invoking tool");
        let value = tool.call(args).await.map_err(|err| {
            error!("Error executing tool {}: {}", name, err);
            err
        })?;

        let text = serde_json::to_string_pretty(&value).map_err(|err| {
            ToolCallError::Execution {
                tool: name.to_string(),
                reason: err.into(),
            }
        })?;
        Ok(ToolCallResult::text(text))
    }
}
