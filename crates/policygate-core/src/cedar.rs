//! The refund-limit Cedar rule.
//!
//! The remote policy engine is authoritative. The local evaluation here uses
//! the same statement text and exists so a rule can be checked (and its
//! decisions previewed) before anything is provisioned.
//!
//! # Entity Model
//!
//! ```text
//! AgentCore::OAuthUser::"<client>"                     (principal)
//! AgentCore::Action::"<target>___<tool>"               (action)
//! AgentCore::Gateway::"<gateway arn>"                  (resource)
//! context.input.<argument>                             (tool arguments)
//! ```

use std::str::FromStr;

use cedar_policy::{
    Authorizer, Context, Decision, Entities, EntityId, EntityTypeName, EntityUid, PolicySet,
    Request,
};

use crate::error::{GateError, GateResult};
use crate::types::Outcome;

const ACTION_TYPE: &str = "AgentCore::Action";
const GATEWAY_TYPE: &str = "AgentCore::Gateway";
const PREVIEW_PRINCIPAL_TYPE: &str = "AgentCore::OAuthUser";
const PREVIEW_PRINCIPAL_ID: &str = "quickstart";

/// Gateway action name of a tool: `<target>___<tool>`.
pub fn action_name(target: &str, tool: &str) -> String {
    format!("{target}___{tool}")
}

/// Permit calls to one tool on one gateway while `amount` stays below a limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRule {
    pub gateway_arn: String,
    pub action: String,
    pub limit: i64,
}

impl RefundRule {
    pub fn new(gateway_arn: impl Into<String>, action: impl Into<String>, limit: i64) -> Self {
        Self {
            gateway_arn: gateway_arn.into(),
            action: action.into(),
            limit,
        }
    }

    /// Cedar statement text submitted to the policy engine.
    pub fn statement(&self) -> String {
        format!(
            "permit(principal, \
             action == {ACTION_TYPE}::\"{action}\", \
             resource == {GATEWAY_TYPE}::\"{arn}\") \
             when {{ context.input.amount < {limit} }};",
            action = self.action,
            arn = self.gateway_arn,
            limit = self.limit,
        )
    }

    /// Policy description shown by the engine.
    pub fn description(&self) -> String {
        format!("Allow refunds under ${}", self.limit)
    }

    /// Parse the statement.
    pub fn validate(&self) -> GateResult<()> {
        self.policy_set().map(|_| ())
    }

    /// Evaluate the statement locally for a refund of `amount`.
    pub fn evaluate(&self, amount: i64) -> GateResult<Outcome> {
        let policy_set = self.policy_set()?;

        let principal = entity_uid(PREVIEW_PRINCIPAL_TYPE, PREVIEW_PRINCIPAL_ID)?;
        let action = entity_uid(ACTION_TYPE, &self.action)?;
        let resource = entity_uid(GATEWAY_TYPE, &self.gateway_arn)?;

        let context = Context::from_json_value(
            serde_json::json!({ "input": { "amount": amount } }),
            None,
        )
        .map_err(|e| GateError::Policy {
            message: format!("invalid request context: {}", e),
        })?;

        let request =
            Request::new(principal, action, resource, context, None).map_err(|e| {
                GateError::Policy {
                    message: format!("invalid request: {}", e),
                }
            })?;

        let response =
            Authorizer::new().is_authorized(&request, &policy_set, &Entities::empty());

        tracing::debug!(
            amount,
            limit = self.limit,
            decision = ?response.decision(),
            "evaluated refund rule locally"
        );

        Ok(match response.decision() {
            Decision::Allow => Outcome::Allowed,
            Decision::Deny => Outcome::Denied,
        })
    }

    fn policy_set(&self) -> GateResult<PolicySet> {
        self.statement()
            .parse()
            .map_err(|e: cedar_policy::ParseErrors| GateError::Policy {
                message: format!("invalid Cedar policy: {}", e),
            })
    }
}

fn entity_uid(type_name: &str, id: &str) -> GateResult<EntityUid> {
    let type_name = EntityTypeName::from_str(type_name).map_err(|e| GateError::Policy {
        message: format!("invalid entity type {type_name}: {e}"),
    })?;
    Ok(EntityUid::from_type_name_and_id(
        type_name,
        EntityId::new(id),
    ))
}
