//! Interfaces of the remote collaborators the workflows drive.
//!
//! `ControlPlaneClient` implements the provisioning traits over HTTP and
//! `OAuthTokenClient` implements [`TokenSource`]; tests substitute in-memory
//! fakes.

use async_trait::async_trait;

use crate::error::GateResult;
use crate::types::{
    AuthorizerResult, ClientInfo, EnforcementMode, EngineResult, FunctionResult, FunctionSpec,
    GatewayResult, GatewaySpec, PolicyResult, PolicySpec, TargetResult, TargetSpec,
};

/// OAuth authorization servers.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an authorization server with one machine client.
    async fn create_oauth_authorizer(&self, client_name: &str) -> GateResult<AuthorizerResult>;

    /// Remove the authorization server behind `client`.
    async fn delete_oauth_authorizer(&self, client: &ClientInfo) -> GateResult<()>;
}

/// Bearer tokens for gateway calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self, client: &ClientInfo) -> GateResult<String>;
}

#[async_trait]
pub trait GatewayService: Send + Sync {
    async fn create_gateway(&self, spec: &GatewaySpec) -> GateResult<GatewayResult>;

    /// Allow the gateway execution role to invoke functions.
    ///
    /// Returns before the grant has propagated.
    async fn grant_invoke_permissions(&self, gateway: &GatewayResult) -> GateResult<()>;

    async fn create_target(&self, gateway_id: &str, spec: &TargetSpec) -> GateResult<TargetResult>;

    async fn attach_policy_engine(
        &self,
        gateway_id: &str,
        policy_engine_arn: &str,
        mode: EnforcementMode,
    ) -> GateResult<()>;

    /// Delete the gateway, its targets and the authorizer behind `client`.
    async fn cleanup_gateway(&self, gateway_id: &str, client: &ClientInfo) -> GateResult<()>;
}

#[async_trait]
pub trait FunctionService: Send + Sync {
    async fn create_function(&self, spec: &FunctionSpec) -> GateResult<FunctionResult>;
}

#[async_trait]
pub trait PolicyService: Send + Sync {
    async fn find_policy_engine(&self, name: &str) -> GateResult<Option<EngineResult>>;

    async fn create_policy_engine(&self, name: &str, description: &str)
        -> GateResult<EngineResult>;

    async fn find_policy(&self, policy_engine_id: &str, name: &str)
        -> GateResult<Option<PolicyResult>>;

    async fn create_policy(
        &self,
        policy_engine_id: &str,
        spec: &PolicySpec,
    ) -> GateResult<PolicyResult>;

    /// Delete every policy of the engine, then the engine.
    async fn cleanup_policy_engine(&self, policy_engine_id: &str) -> GateResult<()>;
}
