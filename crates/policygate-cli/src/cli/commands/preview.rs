use policygate_core::{
    action_name, expected_outcome, QuickstartSettings, RefundRule, DEFAULT_AMOUNTS,
    DEFAULT_REFUND_LIMIT,
};

use super::load_record;
use crate::cli::args::PreviewArgs;
use crate::exit_codes::{POLICY_MISMATCH, SUCCESS};

pub async fn run(args: PreviewArgs) -> anyhow::Result<i32> {
    let (gateway_arn, record_limit) = match &args.config {
        Some(path) => match load_record(path).await? {
            Ok(record) => (record.gateway_arn, Some(record.refund_limit)),
            Err(code) => return Ok(code),
        },
        None => (args.gateway_arn.clone().unwrap_or_default(), None),
    };
    let limit = args
        .refund_limit
        .or(record_limit)
        .unwrap_or(DEFAULT_REFUND_LIMIT);

    let settings = QuickstartSettings::default();
    let rule = RefundRule::new(
        gateway_arn,
        action_name(&settings.target_name, &settings.tool_name),
        limit,
    );

    println!("{}", rule.statement());
    println!();

    if let Err(e) = rule.validate() {
        eprintln!("{e}");
        return Ok(POLICY_MISMATCH);
    }

    let amounts = if args.amounts.is_empty() {
        DEFAULT_AMOUNTS.to_vec()
    } else {
        args.amounts
    };

    let mut code = SUCCESS;
    for amount in amounts {
        let decision = rule.evaluate(amount)?;
        println!("Refund ${amount}: {decision}");
        if decision != expected_outcome(amount, limit) {
            code = POLICY_MISMATCH;
        }
    }
    Ok(code)
}
