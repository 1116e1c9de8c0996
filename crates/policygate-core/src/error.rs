//! Error types for the quickstart workflows.

use std::path::PathBuf;

/// Quickstart errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The deployment record has not been written yet.
    #[error("deployment record not found: {}", path.display())]
    RecordMissing { path: PathBuf },

    /// The deployment record exists but could not be read or written.
    #[error("deployment record error: {message}")]
    Record { message: String },

    /// Authentication failed or a token was rejected.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// A remote resource does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// A remote resource already exists under the requested name.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// A remote service returned a body we could not interpret.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// A remote service rejected the call.
    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The policy statement is not valid Cedar, or could not be evaluated.
    #[error("policy error: {message}")]
    Policy { message: String },

    /// One or more teardown steps failed.
    #[error("cleanup incomplete: {}", failures.join("; "))]
    Cleanup { failures: Vec<String> },
}

impl GateError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RecordMissing { .. } | Self::Config { .. } => 1,

            Self::Unauthorized { .. } => 2,

            Self::Policy { .. } => 3,

            Self::NotFound { .. }
            | Self::Conflict { .. }
            | Self::Network { .. }
            | Self::Remote { .. } => 5,

            Self::Record { .. } | Self::InvalidResponse { .. } => 6,

            Self::Cleanup { .. } => 7,
        }
    }

    pub(crate) fn invalid_response(context: &str, err: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            message: format!("{context}: {err}"),
        }
    }
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for quickstart operations.
pub type GateResult<T> = Result<T, GateError>;
