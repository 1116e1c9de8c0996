use clap::{Parser, Subcommand};
use std::path::PathBuf;

use policygate_core::{DEFAULT_RECORD_PATH, DEFAULT_REFUND_LIMIT, DEFAULT_REGION};

#[derive(Parser)]
#[command(
    name = "policygate",
    version,
    about = "Quickstart for an MCP gateway guarded by a Cedar policy engine: setup, test, cleanup"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the authorizer, gateway, refund tool and policy engine, then save config.json
    Setup(SetupArgs),
    /// Call the refund tool below and above the limit and print the raw responses
    Test(TestArgs),
    /// Remove the policy engine, then the gateway
    Cleanup(CleanupArgs),
    /// Render the refund rule and evaluate it locally (no network)
    Preview(PreviewArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RecordArgs {
    /// Deployment record written by `setup`
    #[arg(long, env = "POLICYGATE_CONFIG", default_value = DEFAULT_RECORD_PATH)]
    pub config: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SetupArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    #[arg(long, env = "POLICYGATE_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Refunds strictly below this amount are permitted
    #[arg(long, env = "POLICYGATE_REFUND_LIMIT", default_value_t = DEFAULT_REFUND_LIMIT)]
    pub refund_limit: i64,

    /// Seconds to wait for IAM propagation after granting invoke permissions
    #[arg(long, default_value_t = 30)]
    pub propagation_wait_secs: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct TestArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Refund amounts to try (default: 500 and 1500)
    #[arg(long = "amount")]
    pub amounts: Vec<i64>,

    /// Exit non-zero when an outcome differs from what the rule should decide
    #[arg(long)]
    pub check: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub record: RecordArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Take gateway ARN and refund limit from a deployment record
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, required_unless_present = "config")]
    pub gateway_arn: Option<String>,

    /// Overrides the record's limit (default: 1000 without a record)
    #[arg(long)]
    pub refund_limit: Option<i64>,

    /// Refund amounts to evaluate (default: 500 and 1500)
    #[arg(long = "amount")]
    pub amounts: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_defaults() {
        let cli = Cli::try_parse_from(["policygate", "setup"]).unwrap();
        match cli.cmd {
            Command::Setup(args) => {
                assert_eq!(args.record.config, PathBuf::from("config.json"));
                assert_eq!(args.region, "us-west-2");
                assert_eq!(args.refund_limit, 1000);
                assert_eq!(args.propagation_wait_secs, 30);
            }
            _ => panic!("expected setup"),
        }
    }

    #[test]
    fn test_repeated_amounts() {
        let cli = Cli::try_parse_from(["policygate", "test", "--amount", "10", "--amount", "2000"])
            .unwrap();
        match cli.cmd {
            Command::Test(args) => assert_eq!(args.amounts, vec![10, 2000]),
            _ => panic!("expected test"),
        }
    }

    #[test]
    fn test_preview_needs_arn_or_config() {
        assert!(Cli::try_parse_from(["policygate", "preview"]).is_err());
        assert!(Cli::try_parse_from(["policygate", "preview", "--config", "c.json"]).is_ok());
        assert!(
            Cli::try_parse_from(["policygate", "preview", "--gateway-arn", "arn:gw"]).is_ok()
        );
    }
}
