//! Smoke test of a provisioned deployment: one call below the refund limit,
//! one above it.

use serde_json::json;
use tracing::info;

use crate::cedar::action_name;
use crate::error::GateResult;
use crate::invoke::{GatewayInvoker, InvocationResponse};
use crate::record::DeploymentRecord;
use crate::services::TokenSource;
use crate::settings::QuickstartSettings;
use crate::types::Outcome;

/// Refund amounts tried by default.
pub const DEFAULT_AMOUNTS: [i64; 2] = [500, 1500];

/// Result of one tool call.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub amount: i64,

    /// What the rule should decide (`amount < refund_limit`).
    pub expected: Outcome,

    /// What the gateway answered.
    pub observed: Outcome,

    pub response: InvocationResponse,
}

impl ScenarioReport {
    pub fn matches(&self) -> bool {
        self.expected == self.observed
    }
}

pub struct Exerciser<'a> {
    tokens: &'a dyn TokenSource,
    invoker: &'a GatewayInvoker,
    tool: String,
}

impl<'a> Exerciser<'a> {
    pub fn new(
        tokens: &'a dyn TokenSource,
        invoker: &'a GatewayInvoker,
        settings: &QuickstartSettings,
    ) -> Self {
        Self {
            tokens,
            invoker,
            tool: action_name(&settings.target_name, &settings.tool_name),
        }
    }

    /// Fetch one token, then call the refund tool once per amount, in order.
    pub async fn run(
        &self,
        record: &DeploymentRecord,
        amounts: &[i64],
    ) -> GateResult<Vec<ScenarioReport>> {
        info!("requesting access token");
        let token = self.tokens.access_token(&record.client_info).await?;

        let mut reports = Vec::with_capacity(amounts.len());
        for &amount in amounts {
            let expected = expected_outcome(amount, record.refund_limit);
            let response = self
                .invoker
                .call_tool(
                    &record.gateway_url,
                    &token,
                    &self.tool,
                    json!({ "amount": amount }),
                )
                .await?;
            let observed = response.outcome();
            info!(amount, status = response.status, %expected, %observed, "refund call finished");

            reports.push(ScenarioReport {
                amount,
                expected,
                observed,
                response,
            });
        }

        Ok(reports)
    }
}

/// Strictly below the limit is allowed; the limit itself is not.
pub fn expected_outcome(amount: i64, limit: i64) -> Outcome {
    if amount < limit {
        Outcome::Allowed
    } else {
        Outcome::Denied
    }
}
