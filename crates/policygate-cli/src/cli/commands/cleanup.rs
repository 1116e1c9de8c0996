use anyhow::Context;
use policygate_core::{ControlPlaneClient, ControlPlaneConfig, Decommissioner};

use super::load_record;
use crate::cli::args::CleanupArgs;
use crate::exit_codes::SUCCESS;

pub async fn run(args: CleanupArgs) -> anyhow::Result<i32> {
    let record = match load_record(&args.record.config).await? {
        Ok(record) => record,
        Err(code) => return Ok(code),
    };

    let client = ControlPlaneClient::new(ControlPlaneConfig::from_env(&record.region))
        .context("creating control-plane client")?;

    println!("Cleaning up policy engine {}...", record.policy_engine_id);
    println!("Cleaning up gateway {}...", record.gateway_id);
    Decommissioner::new(&client, &client).run(&record).await?;

    println!("Cleanup complete!");
    Ok(SUCCESS)
}
