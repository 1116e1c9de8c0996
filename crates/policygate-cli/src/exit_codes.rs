//! Exit codes of the `policygate` binary.
//! These codes are part of the public contract; scripts chaining setup, test
//! and cleanup rely on them.

use policygate_core::GateError;

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 1; // Missing deployment record, bad flags
pub const AUTH_ERROR: i32 = 2; // Token or control-plane credentials rejected
pub const POLICY_MISMATCH: i32 = 3; // Invalid rule, or `test --check` saw an unexpected outcome
pub const REMOTE_ERROR: i32 = 5; // Remote service fault or network error
pub const INTERNAL_ERROR: i32 = 6; // Malformed record or response
pub const CLEANUP_FAILED: i32 = 7; // At least one teardown step failed

/// Exit code for an error that escaped a command.
pub fn for_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GateError>())
        .map(GateError::exit_code)
        .unwrap_or(INTERNAL_ERROR)
}
