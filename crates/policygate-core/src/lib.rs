//! Provisioning, invocation and teardown of an MCP gateway guarded by a
//! Cedar policy engine.
//!
//! This crate provides:
//!
//! - Typed interfaces to the identity, gateway, function and policy services
//! - An HTTP control-plane client implementing them
//! - OAuth client-credentials tokens and JSON-RPC tool calls
//! - The refund-limit Cedar rule, with local validation and preview
//! - The three workflows: setup, test and cleanup
//!
//! # Quick Start
//!
//! ```no_run
//! use policygate_core::{ControlPlaneClient, Provisioner, QuickstartSettings};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = QuickstartSettings::default();
//! let client = ControlPlaneClient::from_env(&settings.region)?;
//!
//! let record = Provisioner::new(&client, &client, &client, &client)
//!     .run(&settings)
//!     .await?;
//! println!("gateway ready at {}", record.gateway_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `POLICYGATE_CONTROL_URL` | Control-plane base URL (default: regional endpoint) |
//! | `POLICYGATE_CONTROL_TOKEN` | Bearer token for the control plane |
//! | `POLICYGATE_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod cedar;
pub mod client;
pub mod decommission;
pub mod error;
pub mod exercise;
pub mod invoke;
pub mod jsonrpc;
pub mod provision;
pub mod record;
pub mod services;
pub mod settings;
pub mod token;
pub mod types;

pub use cedar::{action_name, RefundRule};
pub use client::ControlPlaneClient;
pub use decommission::Decommissioner;
pub use error::{GateError, GateResult};
pub use exercise::{expected_outcome, Exerciser, ScenarioReport, DEFAULT_AMOUNTS};
pub use invoke::{GatewayInvoker, InvocationResponse};
pub use provision::{refund_tool, Provisioner};
pub use record::DeploymentRecord;
pub use services::{FunctionService, GatewayService, IdentityService, PolicyService, TokenSource};
pub use settings::{
    ControlPlaneConfig, QuickstartSettings, DEFAULT_PROPAGATION_WAIT, DEFAULT_RECORD_PATH,
    DEFAULT_REFUND_LIMIT, DEFAULT_REGION,
};
pub use token::OAuthTokenClient;
pub use types::{
    AuthorizerConfig, AuthorizerResult, ClientInfo, CustomJwtAuthorizer, EnforcementMode,
    EngineResult, FunctionResult, FunctionSpec, GatewayResult, GatewaySpec, Outcome,
    PolicyResult, PolicySpec, TargetResult, TargetSpec, ToolDefinition,
};
