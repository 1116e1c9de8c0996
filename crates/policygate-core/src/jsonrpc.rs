//! JSON-RPC envelope for MCP `tools/call`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const TOOLS_CALL: &str = "tools/call";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: P,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// `tools/call` request.
pub type ToolCallRequest = JsonRpcRequest<CallToolParams>;

impl ToolCallRequest {
    pub fn tool_call(id: u64, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: TOOLS_CALL,
            params: CallToolParams {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// Whether a JSON-RPC response body reports a failed call.
///
/// Either a top-level `error` member, or a tool result flagged `isError`.
pub fn is_error_body(body: &Value) -> bool {
    if body.get("error").is_some_and(|e| !e.is_null()) {
        return true;
    }
    body.get("result")
        .and_then(|r| r.get("isError"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
