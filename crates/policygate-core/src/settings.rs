//! Configuration for the control-plane client and the quickstart workflows.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Refund threshold used when none is configured.
pub const DEFAULT_REFUND_LIMIT: i64 = 1000;

/// Where the deployment record is written.
pub const DEFAULT_RECORD_PATH: &str = "config.json";

/// Wait after granting the gateway role invoke permissions.
pub const DEFAULT_PROPAGATION_WAIT: Duration = Duration::from_secs(30);

/// Control-plane endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    /// Base URL of the control plane.
    pub url: String,

    /// Bearer token attached to every control-plane request.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Regional control-plane endpoint.
pub fn default_control_url(region: &str) -> String {
    format!("https://bedrock-agentcore-control.{region}.amazonaws.com")
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            url: default_control_url(DEFAULT_REGION),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ControlPlaneConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `POLICYGATE_CONTROL_URL` | Control-plane base URL (default: regional endpoint) |
    /// | `POLICYGATE_CONTROL_TOKEN` | Bearer token for the control plane |
    /// | `POLICYGATE_TIMEOUT` | Request timeout in seconds (default: 30) |
    pub fn from_env(region: &str) -> Self {
        Self {
            url: std::env::var("POLICYGATE_CONTROL_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default_control_url(region)),
            token: std::env::var("POLICYGATE_CONTROL_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_secs: std::env::var("POLICYGATE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Parameters of one quickstart deployment.
///
/// Resource names default to the refund demo: an authorizer client
/// `PolicyGateway`, target `RefundTarget` exposing `process_refund`, engine
/// `RefundPolicyEngine` and policy `refund_limit_policy`.
#[derive(Debug, Clone)]
pub struct QuickstartSettings {
    pub region: String,
    pub refund_limit: i64,
    pub record_path: PathBuf,
    pub propagation_wait: Duration,
    pub client_name: String,
    pub target_name: String,
    pub tool_name: String,
    pub engine_name: String,
    pub policy_name: String,
    pub function_runtime: String,
}

impl Default for QuickstartSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            refund_limit: DEFAULT_REFUND_LIMIT,
            record_path: PathBuf::from(DEFAULT_RECORD_PATH),
            propagation_wait: DEFAULT_PROPAGATION_WAIT,
            client_name: "PolicyGateway".to_string(),
            target_name: "RefundTarget".to_string(),
            tool_name: "process_refund".to_string(),
            engine_name: "RefundPolicyEngine".to_string(),
            policy_name: "refund_limit_policy".to_string(),
            function_runtime: "python3.13".to_string(),
        }
    }
}

impl QuickstartSettings {
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_refund_limit(mut self, limit: i64) -> Self {
        self.refund_limit = limit;
        self
    }

    pub fn with_record_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_path = path.into();
        self
    }

    pub fn with_propagation_wait(mut self, wait: Duration) -> Self {
        self.propagation_wait = wait;
        self
    }
}
