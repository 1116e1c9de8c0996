//! The deployment record (`config.json`).
//!
//! Written once at the end of setup, read by `test` and `cleanup`. There is
//! no update path.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{GateError, GateResult};
use crate::types::{AuthorizerResult, ClientInfo, EngineResult, GatewayResult, PolicyResult};

/// Identifiers of a provisioned deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub gateway_url: String,
    pub gateway_id: String,
    pub gateway_arn: String,
    pub policy_engine_id: String,
    pub policy_engine_arn: String,
    pub policy_id: String,
    pub region: String,
    pub client_info: ClientInfo,
    pub refund_limit: i64,
}

impl DeploymentRecord {
    /// Build the record from the results of the setup steps.
    pub fn assemble(
        region: &str,
        refund_limit: i64,
        authorizer: &AuthorizerResult,
        gateway: &GatewayResult,
        engine: &EngineResult,
        policy: &PolicyResult,
    ) -> Self {
        Self {
            gateway_url: gateway.gateway_url.clone(),
            gateway_id: gateway.gateway_id.clone(),
            gateway_arn: gateway.gateway_arn.clone(),
            policy_engine_id: engine.policy_engine_id.clone(),
            policy_engine_arn: engine.policy_engine_arn.clone(),
            policy_id: policy.policy_id.clone(),
            region: region.to_string(),
            client_info: authorizer.client_info.clone(),
            refund_limit,
        }
    }

    /// Read a record. A missing file is reported as `RecordMissing`.
    pub async fn load(path: &Path) -> GateResult<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GateError::RecordMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(GateError::Record {
                    message: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| GateError::Record {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Write the record as pretty JSON (temp file + rename).
    pub async fn save(&self, path: &Path) -> GateResult<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| GateError::Record {
            message: format!("failed to serialize record: {}", e),
        })?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| GateError::Record {
                message: format!("failed to write temp file: {}", e),
            })?;

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| GateError::Record {
                message: format!("failed to rename temp file: {}", e),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_record() -> DeploymentRecord {
        DeploymentRecord {
            gateway_url: "https://gw-1.gateway.example/mcp".into(),
            gateway_id: "gw-1".into(),
            gateway_arn: "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/gw-1".into(),
            policy_engine_id: "pe-1".into(),
            policy_engine_arn: "arn:aws:bedrock-agentcore:us-west-2:123456789012:policy-engine/pe-1"
                .into(),
            policy_id: "pol-1".into(),
            region: "us-west-2".into(),
            client_info: ClientInfo {
                client_id: "client".into(),
                client_secret: "secret".into(),
                token_endpoint: "https://auth.example/oauth2/token".into(),
                scope: Some("PolicyGateway/invoke".into()),
                user_pool_id: Some("us-west-2_pool".into()),
                domain_prefix: None,
                extra: BTreeMap::new(),
            },
            refund_limit: 1000,
        }
    }

    #[tokio::test]
    async fn test_record_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let record = sample_record();
        record.save(&path).await.unwrap();

        let loaded = DeploymentRecord::load(&path).await.unwrap();
        assert_eq!(loaded, record);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_record_has_nine_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        sample_record().save(&path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 9);
        for key in [
            "gateway_url",
            "gateway_id",
            "gateway_arn",
            "policy_engine_id",
            "policy_engine_arn",
            "policy_id",
            "region",
            "client_info",
            "refund_limit",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["refund_limit"].is_i64());
        assert!(raw.contains("\n  \"gateway_url\""), "expected 2-space indent");
    }

    #[tokio::test]
    async fn test_missing_record() {
        let dir = TempDir::new().unwrap();
        let result = DeploymentRecord::load(&dir.path().join("config.json")).await;
        assert!(matches!(result, Err(GateError::RecordMissing { .. })));
    }

    #[tokio::test]
    async fn test_malformed_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{\"gateway_url\": 3").unwrap();

        let result = DeploymentRecord::load(&path).await;
        assert!(matches!(result, Err(GateError::Record { .. })));
    }
}
