//! Setup: authorizer, gateway, refund tool, policy engine, policy.
//!
//! Steps run strictly in order and the first failure aborts the run.
//! Resources created before the failure are left in place; `cleanup`
//! removes them once a record exists.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::cedar::{action_name, RefundRule};
use crate::error::GateResult;
use crate::record::DeploymentRecord;
use crate::services::{FunctionService, GatewayService, IdentityService, PolicyService};
use crate::settings::QuickstartSettings;
use crate::types::{
    EnforcementMode, EngineResult, FunctionSpec, GatewaySpec, PolicyResult, PolicySpec, TargetSpec,
    ToolDefinition,
};

/// Source of the refund function.
pub const REFUND_HANDLER_SOURCE: &str = r#"
def lambda_handler(event, context):
    amount = event.get('amount', 0)
    return {
        "status": "success",
        "message": f"Refund of ${amount} processed successfully",
        "amount": amount
    }
"#;

const REFUND_HANDLER: &str = "lambda_function.lambda_handler";
const ENGINE_DESCRIPTION: &str = "Policy engine for refund governance";

/// The `process_refund` tool: one required integer argument, `amount`.
pub fn refund_tool(tool_name: &str) -> ToolDefinition {
    ToolDefinition {
        name: tool_name.to_string(),
        description: "Process a customer refund".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "integer",
                    "description": "Refund amount in dollars"
                }
            },
            "required": ["amount"]
        }),
    }
}

/// Drives the setup steps against the remote services.
pub struct Provisioner<'a> {
    identity: &'a dyn IdentityService,
    gateways: &'a dyn GatewayService,
    functions: &'a dyn FunctionService,
    policies: &'a dyn PolicyService,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        identity: &'a dyn IdentityService,
        gateways: &'a dyn GatewayService,
        functions: &'a dyn FunctionService,
        policies: &'a dyn PolicyService,
    ) -> Self {
        Self {
            identity,
            gateways,
            functions,
            policies,
        }
    }

    /// Provision everything, attach the engine in enforcing mode and write
    /// the deployment record to `settings.record_path`.
    pub async fn run(&self, settings: &QuickstartSettings) -> GateResult<DeploymentRecord> {
        info!(region = %settings.region, "step 1: creating OAuth authorization server");
        let authorizer = self
            .identity
            .create_oauth_authorizer(&settings.client_name)
            .await?;

        info!("step 2: creating gateway");
        let gateway = self
            .gateways
            .create_gateway(&GatewaySpec {
                name: None,
                role_arn: None,
                authorizer_config: authorizer.authorizer_config.clone(),
                semantic_search: false,
            })
            .await?;
        info!(gateway_url = %gateway.gateway_url, "gateway created");

        self.gateways.grant_invoke_permissions(&gateway).await?;
        info!(
            wait_secs = settings.propagation_wait.as_secs(),
            "waiting for IAM propagation"
        );
        tokio::time::sleep(settings.propagation_wait).await;

        info!("step 3: creating refund function");
        let function = self
            .functions
            .create_function(&FunctionSpec {
                function_name: format!("RefundTool-{}", Utc::now().timestamp()),
                runtime: settings.function_runtime.clone(),
                handler: REFUND_HANDLER.to_string(),
                code: REFUND_HANDLER_SOURCE.to_string(),
                role_arn: gateway.role_arn.clone(),
                description: "Refund tool for policy demo".to_string(),
            })
            .await?;

        info!(target_name = %settings.target_name, "step 4: adding function target");
        let target = self
            .gateways
            .create_target(
                &gateway.gateway_id,
                &TargetSpec {
                    name: settings.target_name.clone(),
                    function_arn: function.function_arn.clone(),
                    tools: vec![refund_tool(&settings.tool_name)],
                },
            )
            .await?;
        info!(target_id = %target.target_id, "target added");

        info!(engine = %settings.engine_name, "step 5: creating policy engine");
        let engine = self.policy_engine(&settings.engine_name).await?;
        info!(policy_engine_id = %engine.policy_engine_id, "policy engine ready");

        let rule = RefundRule::new(
            gateway.gateway_arn.clone(),
            action_name(&settings.target_name, &settings.tool_name),
            settings.refund_limit,
        );
        rule.validate()?;

        info!(limit = settings.refund_limit, "step 6: creating Cedar policy");
        let policy = self
            .policy(
                &engine.policy_engine_id,
                &PolicySpec {
                    name: settings.policy_name.clone(),
                    description: rule.description(),
                    statement: rule.statement(),
                },
            )
            .await?;
        info!(policy_id = %policy.policy_id, "policy ready");

        info!("step 7: attaching policy engine to gateway (ENFORCE)");
        self.gateways
            .attach_policy_engine(
                &gateway.gateway_id,
                &engine.policy_engine_arn,
                EnforcementMode::Enforce,
            )
            .await?;

        let record = DeploymentRecord::assemble(
            &settings.region,
            settings.refund_limit,
            &authorizer,
            &gateway,
            &engine,
            &policy,
        );
        record.save(&settings.record_path).await?;
        info!(path = %settings.record_path.display(), "deployment record saved");

        Ok(record)
    }

    async fn policy_engine(&self, name: &str) -> GateResult<EngineResult> {
        if let Some(existing) = self.policies.find_policy_engine(name).await? {
            info!(policy_engine_id = %existing.policy_engine_id, "reusing existing policy engine");
            return Ok(existing);
        }
        self.policies
            .create_policy_engine(name, ENGINE_DESCRIPTION)
            .await
    }

    async fn policy(&self, policy_engine_id: &str, spec: &PolicySpec) -> GateResult<PolicyResult> {
        if let Some(existing) = self
            .policies
            .find_policy(policy_engine_id, &spec.name)
            .await?
        {
            info!(policy_id = %existing.policy_id, "reusing existing policy");
            return Ok(existing);
        }
        self.policies.create_policy(policy_engine_id, spec).await
    }
}
