//! Control-plane client for gateways, functions, identity and policy engines.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GateError, GateResult};
use crate::services::{FunctionService, GatewayService, IdentityService, PolicyService};
use crate::settings::ControlPlaneConfig;
use crate::types::{
    AuthorizerResult, ClientInfo, EnforcementMode, EngineResult, FunctionResult, FunctionSpec,
    GatewayResult, GatewaySpec, PolicyResult, PolicySpec, TargetResult, TargetSpec,
};

mod helpers;
mod http;

use helpers::{endpoint, parse_page};
use http::HttpBackend;

const USER_AGENT_VALUE: &str = concat!("policygate/", env!("CARGO_PKG_VERSION"));

/// Client for the provisioning control plane.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    http: HttpBackend,
}

impl ControlPlaneClient {
    pub fn new(config: ControlPlaneConfig) -> GateResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| GateError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = Url::parse(&config.url).map_err(|e| GateError::Config {
            message: format!("invalid control-plane URL {}: {}", config.url, e),
        })?;

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                token: config.token,
            },
        })
    }

    pub fn from_env(region: &str) -> GateResult<Self> {
        Self::new(ControlPlaneConfig::from_env(region))
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url.as_str()
    }

    fn url(&self, segments: &[&str]) -> GateResult<Url> {
        endpoint(&self.http.base_url, segments)
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> GateResult<T> {
        let url = self.url(segments)?;
        let value = self.http.send_json(Method::POST, url, Some(body)).await?;
        decode(value, segments)
    }

    async fn delete(&self, segments: &[&str]) -> GateResult<()> {
        let url = self.url(segments)?;
        self.http.request(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Follow `nextToken` until every item under `key` has been read.
    async fn list_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        key: &str,
    ) -> GateResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut url = self.url(segments)?;
            if let Some(token) = &next_token {
                url.query_pairs_mut().append_pair("nextToken", token);
            }

            let body = self.http.send_json(Method::GET, url, None).await?;
            let (page, next) = parse_page(body, key)?;
            items.extend(page);

            match next {
                Some(token) => next_token = Some(token),
                None => return Ok(items),
            }
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value, segments: &[&str]) -> GateResult<T> {
    serde_json::from_value(value).map_err(|e| {
        GateError::invalid_response(&format!("unexpected body from /{}", segments.join("/")), e)
    })
}

#[async_trait]
impl IdentityService for ControlPlaneClient {
    async fn create_oauth_authorizer(&self, client_name: &str) -> GateResult<AuthorizerResult> {
        debug!(client_name, "creating OAuth authorizer");
        self.post(
            &["identity", "oauth-authorizers"],
            &json!({ "clientName": client_name }),
        )
        .await
    }

    async fn delete_oauth_authorizer(&self, client: &ClientInfo) -> GateResult<()> {
        let Some(pool_id) = client.user_pool_id.as_deref() else {
            warn!(
                client_id = %client.client_id,
                "client info has no user_pool_id; authorizer left in place"
            );
            return Ok(());
        };

        debug!(pool_id, "deleting OAuth authorizer");
        self.delete(&["identity", "oauth-authorizers", pool_id]).await
    }
}

#[async_trait]
impl GatewayService for ControlPlaneClient {
    async fn create_gateway(&self, spec: &GatewaySpec) -> GateResult<GatewayResult> {
        let mut body = json!({
            "protocolType": "MCP",
            "authorizerType": "CUSTOM_JWT",
            "authorizerConfiguration": spec.authorizer_config,
        });
        if let Some(name) = &spec.name {
            body["name"] = json!(name);
        }
        if let Some(role_arn) = &spec.role_arn {
            body["roleArn"] = json!(role_arn);
        }
        if spec.semantic_search {
            body["protocolConfiguration"] = json!({ "mcp": { "searchType": "SEMANTIC" } });
        }

        debug!(semantic_search = spec.semantic_search, "creating gateway");
        self.post(&["gateways", ""], &body).await
    }

    async fn grant_invoke_permissions(&self, gateway: &GatewayResult) -> GateResult<()> {
        let url = self.url(&[
            "gateways",
            gateway.gateway_id.as_str(),
            "execution-role",
            "permissions",
        ])?;
        let body = json!({
            "roleArn": gateway.role_arn,
            "actions": ["lambda:InvokeFunction"],
        });
        self.http.send_json(Method::POST, url, Some(&body)).await?;
        Ok(())
    }

    async fn create_target(&self, gateway_id: &str, spec: &TargetSpec) -> GateResult<TargetResult> {
        let body = json!({
            "name": spec.name,
            "targetConfiguration": {
                "mcp": {
                    "lambda": {
                        "lambdaArn": spec.function_arn,
                        "toolSchema": { "inlinePayload": spec.tools },
                    }
                }
            },
            "credentialProviderConfigurations": [
                { "credentialProviderType": "GATEWAY_IAM_ROLE" }
            ],
        });

        debug!(gateway_id, target_name = %spec.name, "creating gateway target");
        self.post(&["gateways", gateway_id, "targets", ""], &body)
            .await
    }

    async fn attach_policy_engine(
        &self,
        gateway_id: &str,
        policy_engine_arn: &str,
        mode: EnforcementMode,
    ) -> GateResult<()> {
        let url = self.url(&["gateways", gateway_id, "policy-engine"])?;
        let body = json!({
            "policyEngineConfiguration": {
                "arn": policy_engine_arn,
                "mode": mode,
            }
        });
        self.http.send_json(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    async fn cleanup_gateway(&self, gateway_id: &str, client: &ClientInfo) -> GateResult<()> {
        let targets: Vec<TargetResult> = self
            .list_all(&["gateways", gateway_id, "targets", ""], "items")
            .await?;

        for target in &targets {
            info!(gateway_id, target_id = %target.target_id, "deleting gateway target");
            self.delete(&["gateways", gateway_id, "targets", target.target_id.as_str()])
                .await?;
        }

        info!(gateway_id, "deleting gateway");
        self.delete(&["gateways", gateway_id, ""]).await?;

        self.delete_oauth_authorizer(client).await
    }
}

#[async_trait]
impl FunctionService for ControlPlaneClient {
    async fn create_function(&self, spec: &FunctionSpec) -> GateResult<FunctionResult> {
        let body = serde_json::to_value(spec)
            .map_err(|e| GateError::invalid_response("failed to encode function spec", e))?;

        debug!(function_name = %spec.function_name, "creating function");
        self.post(&["functions"], &body).await
    }
}

#[async_trait]
impl PolicyService for ControlPlaneClient {
    async fn find_policy_engine(&self, name: &str) -> GateResult<Option<EngineResult>> {
        let engines: Vec<EngineResult> = self
            .list_all(&["policy-engines"], "policyEngines")
            .await?;
        Ok(engines
            .into_iter()
            .find(|e| e.name.as_deref() == Some(name)))
    }

    async fn create_policy_engine(
        &self,
        name: &str,
        description: &str,
    ) -> GateResult<EngineResult> {
        self.post(
            &["policy-engines"],
            &json!({ "name": name, "description": description }),
        )
        .await
    }

    async fn find_policy(
        &self,
        policy_engine_id: &str,
        name: &str,
    ) -> GateResult<Option<PolicyResult>> {
        let policies: Vec<PolicyResult> = self
            .list_all(&["policy-engines", policy_engine_id, "policies"], "policies")
            .await?;
        Ok(policies
            .into_iter()
            .find(|p| p.name.as_deref() == Some(name)))
    }

    async fn create_policy(
        &self,
        policy_engine_id: &str,
        spec: &PolicySpec,
    ) -> GateResult<PolicyResult> {
        let body = json!({
            "name": spec.name,
            "description": spec.description,
            "definition": { "cedar": { "statement": spec.statement } },
        });
        self.post(&["policy-engines", policy_engine_id, "policies"], &body)
            .await
    }

    async fn cleanup_policy_engine(&self, policy_engine_id: &str) -> GateResult<()> {
        let policies: Vec<PolicyResult> = self
            .list_all(&["policy-engines", policy_engine_id, "policies"], "policies")
            .await?;

        for policy in &policies {
            info!(policy_engine_id, policy_id = %policy.policy_id, "deleting policy");
            self.delete(&[
                "policy-engines",
                policy_engine_id,
                "policies",
                policy.policy_id.as_str(),
            ])
            .await?;
        }

        info!(policy_engine_id, "deleting policy engine");
        self.delete(&["policy-engines", policy_engine_id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = ControlPlaneConfig::default().with_url("not a url");
        assert!(matches!(
            ControlPlaneClient::new(config),
            Err(GateError::Config { .. })
        ));
    }

    #[test]
    fn test_base_url() {
        let config = ControlPlaneConfig::default().with_url("http://127.0.0.1:9000/");
        let client = ControlPlaneClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000/");
    }
}
