//! Teardown: policy engine first, then the gateway.
//!
//! The gateway step runs even when the policy-engine step failed; every
//! failure is collected into one `GateError::Cleanup`.

use tracing::{info, warn};

use crate::error::{GateError, GateResult};
use crate::record::DeploymentRecord;
use crate::services::{GatewayService, PolicyService};

pub struct Decommissioner<'a> {
    gateways: &'a dyn GatewayService,
    policies: &'a dyn PolicyService,
}

impl<'a> Decommissioner<'a> {
    pub fn new(gateways: &'a dyn GatewayService, policies: &'a dyn PolicyService) -> Self {
        Self { gateways, policies }
    }

    pub async fn run(&self, record: &DeploymentRecord) -> GateResult<()> {
        let mut failures = Vec::new();

        info!(policy_engine_id = %record.policy_engine_id, "cleaning up policy engine");
        if let Err(e) = self
            .policies
            .cleanup_policy_engine(&record.policy_engine_id)
            .await
        {
            warn!(error = %e, "policy engine cleanup failed, continuing with gateway");
            failures.push(format!("policy engine {}: {}", record.policy_engine_id, e));
        }

        info!(gateway_id = %record.gateway_id, "cleaning up gateway");
        if let Err(e) = self
            .gateways
            .cleanup_gateway(&record.gateway_id, &record.client_info)
            .await
        {
            warn!(error = %e, "gateway cleanup failed");
            failures.push(format!("gateway {}: {}", record.gateway_id, e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GateError::Cleanup { failures })
        }
    }
}
