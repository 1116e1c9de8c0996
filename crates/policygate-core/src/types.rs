//! Request and result types exchanged with the remote services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client credential metadata returned by the identity provider.
///
/// Everything needed to request tokens later. Keys this crate does not know
/// about are kept in `extra` so the record round-trips verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: String,

    pub client_secret: String,

    /// OAuth token endpoint (client credentials grant).
    pub token_endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Identity pool backing the authorizer; used for teardown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_prefix: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// JWT authorizer settings the gateway validates inbound tokens against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    #[serde(rename = "customJWTAuthorizer")]
    pub custom_jwt_authorizer: CustomJwtAuthorizer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomJwtAuthorizer {
    pub discovery_url: String,

    #[serde(default)]
    pub allowed_clients: Vec<String>,
}

/// Result of creating the OAuth authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResult {
    pub authorizer_config: AuthorizerConfig,
    pub client_info: ClientInfo,
}

/// Gateway creation request.
#[derive(Debug, Clone)]
pub struct GatewaySpec {
    /// Gateway name; the service picks one when absent.
    pub name: Option<String>,

    /// Execution role; the service creates one when absent.
    pub role_arn: Option<String>,

    pub authorizer_config: AuthorizerConfig,

    /// Semantic tool discovery.
    pub semantic_search: bool,
}

/// Result of creating a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResult {
    pub gateway_id: String,
    pub gateway_arn: String,
    pub gateway_url: String,
    pub role_arn: String,
}

/// Serverless function creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    pub function_name: String,
    pub runtime: String,
    pub handler: String,

    /// Handler source, packaged by the function service.
    pub code: String,

    /// Role the function trusts for invocation (the gateway's role).
    pub role_arn: String,

    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    pub function_arn: String,
}

/// A tool exposed by a gateway target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    /// JSON schema of the tool arguments.
    pub input_schema: Value,
}

/// Gateway target creation request: a function backing one or more tools.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub name: String,
    pub function_arn: String,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub target_id: String,

    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub policy_engine_id: String,
    pub policy_engine_arn: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// Policy creation request.
#[derive(Debug, Clone)]
pub struct PolicySpec {
    pub name: String,
    pub description: String,

    /// Cedar statement text.
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResult {
    pub policy_id: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// How the gateway applies policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementMode {
    /// Deny decisions block the tool call.
    Enforce,
    /// Decisions are logged, calls always proceed.
    LogOnly,
}

/// Authorization outcome of a tool call, as observed or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allowed,
    Denied,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => f.write_str("ALLOW"),
            Self::Denied => f.write_str("DENY"),
        }
    }
}
