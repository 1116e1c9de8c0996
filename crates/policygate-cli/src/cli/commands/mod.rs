use std::path::Path;

use policygate_core::{DeploymentRecord, GateError};

use super::args::*;
use crate::exit_codes::{CONFIG_ERROR, SUCCESS};

pub mod cleanup;
pub mod preview;
pub mod setup;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Setup(args) => setup::run(args).await,
        Command::Test(args) => test::run(args).await,
        Command::Cleanup(args) => cleanup::run(args).await,
        Command::Preview(args) => preview::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Load the deployment record. A missing record prints setup guidance and
/// yields `Err(CONFIG_ERROR)` as the exit code; nothing else is attempted.
pub(crate) async fn load_record(path: &Path) -> anyhow::Result<Result<DeploymentRecord, i32>> {
    match DeploymentRecord::load(path).await {
        Ok(record) => Ok(Ok(record)),
        Err(GateError::RecordMissing { path }) => {
            println!("Error: {} not found!", path.display());
            println!("Please run 'policygate setup' first.");
            Ok(Err(CONFIG_ERROR))
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn rule_line() {
    println!("{}", "=".repeat(60));
}
