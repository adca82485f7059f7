//! # MCP Handler Module
//!
//! Main dispatcher for incoming MCP requests. The protocol surface is
//! `initialize`, `tools/list` and `tools/call`; the actual tool set is
//! whatever the aggregator bound at startup, served through the
//! `McpToolAdapter` held in `AppState`.
//!
//! Tool-call failures map onto JSON-RPC codes: unknown tool name is
//! METHOD_NOT_FOUND, argument problems are INVALID_PARAMS, handler
//! failures are INTERNAL_ERROR.

use serde_json::{json, Value};
use tracing::info;

use crate::core::error::ToolCallError;
use crate::mcp::protocol::{error_codes, Request, Response};
use crate::AppState;

/// This is the main dispatcher for all incoming MCP requests.
/// Notifications (null id) produce no response.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req, &state),
        "tools/call" => handle_tool_call(req, state).await,
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "vechain-mcp-server",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "VeChain blockchain MCP server for wallet operations, token transfers, DEX queries and on-chain analytics.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request from the aggregated descriptors.
fn handle_tools_list(req: &Request, state: &AppState) -> Response {
    match serde_json::to_value(state.adapter.list()) {
        Ok(tools) => Response::success(req.id.clone(), json!({ "tools": tools })),
        Err(err) => Response::error(
            req.id.clone(),
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize tool list: {}", err),
        ),
    }
}

/// Handles a 'tools/call' request by dispatching through the adapter.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name.to_string(),
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let arguments: Option<Value> = params.get("arguments").cloned();

    match state.adapter.invoke(&tool_name, arguments).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => Response::success(req.id, value),
            Err(err) => Response::error(
                req.id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize result for {}: {}", tool_name, err),
            ),
        },
        Err(err) => Response::error(req.id, call_error_code(&err), err.to_string()),
    }
}

fn call_error_code(error: &ToolCallError) -> i32 {
    match error {
        ToolCallError::NotFound(_) => error_codes::METHOD_NOT_FOUND,
        ToolCallError::InvalidArguments { .. } | ToolCallError::Rehydration { .. } => {
            error_codes::INVALID_PARAMS
        }
        ToolCallError::Execution { .. } => error_codes::INTERNAL_ERROR,
    }
}
