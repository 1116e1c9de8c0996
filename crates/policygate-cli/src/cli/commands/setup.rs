use std::time::Duration;

use anyhow::Context;
use policygate_core::{ControlPlaneClient, ControlPlaneConfig, Provisioner, QuickstartSettings};

use super::rule_line;
use crate::cli::args::SetupArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(args: SetupArgs) -> anyhow::Result<i32> {
    let settings = QuickstartSettings::default()
        .with_region(args.region)
        .with_refund_limit(args.refund_limit)
        .with_record_path(args.record.config)
        .with_propagation_wait(Duration::from_secs(args.propagation_wait_secs));

    println!("Setting up gateway with policy engine...");
    println!("Region: {}", settings.region);
    println!();

    let client = ControlPlaneClient::new(ControlPlaneConfig::from_env(&settings.region))
        .context("creating control-plane client")?;
    let record = Provisioner::new(&client, &client, &client, &client)
        .run(&settings)
        .await?;

    rule_line();
    println!("Setup complete!");
    println!("Gateway URL: {}", record.gateway_url);
    println!("Policy Engine ID: {}", record.policy_engine_id);
    println!("Refund limit: ${}", record.refund_limit);
    println!();
    println!("Configuration saved to: {}", settings.record_path.display());
    println!();
    println!("Next step: run 'policygate test' to exercise the policy");
    rule_line();

    Ok(SUCCESS)
}
