//! Tool calls against the gateway endpoint.
//!
//! The HTTP status is reported, never turned into an error: a denied call is
//! a result the caller wants to see.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::error::{GateError, GateResult};
use crate::jsonrpc::{is_error_body, ToolCallRequest};
use crate::types::Outcome;

/// Raw response of a tool call.
#[derive(Debug, Clone)]
pub struct InvocationResponse {
    pub status: u16,

    /// Parsed JSON body, or the raw text as a JSON string when it is not JSON.
    pub body: Value,
}

impl InvocationResponse {
    /// Denied when the status is not 2xx, or the body reports a JSON-RPC
    /// error or an `isError` tool result.
    pub fn outcome(&self) -> Outcome {
        if !(200..300).contains(&self.status) || is_error_body(&self.body) {
            Outcome::Denied
        } else {
            Outcome::Allowed
        }
    }

    /// Body for display (pretty JSON, or the raw text).
    pub fn body_pretty(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

/// Issues JSON-RPC tool calls to a gateway URL.
#[derive(Debug, Clone)]
pub struct GatewayInvoker {
    client: reqwest::Client,
}

impl GatewayInvoker {
    pub fn new(timeout: Duration) -> GateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    pub async fn call_tool(
        &self,
        gateway_url: &str,
        bearer_token: &str,
        tool: &str,
        arguments: Value,
    ) -> GateResult<InvocationResponse> {
        let request = ToolCallRequest::tool_call(1, tool, arguments);
        debug!(gateway_url, tool, "calling gateway tool");

        let response = self
            .client
            .post(gateway_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", bearer_token))
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| GateError::Network {
            message: format!("failed to read response body: {}", e),
        })?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(InvocationResponse { status, body })
    }
}
