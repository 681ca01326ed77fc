//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors where the failure class matters to
//! the driver (gating vs. best-effort); everything else flows through
//! [`anyhow::Error`] with context, converted at the CLI boundary via `?`.

use thiserror::Error;

/// Failures that gate the whole run and map to exit code 1.
#[derive(Error, Debug)]
pub enum GateError {
    /// The operator declined to continue on an unsupported distribution.
    #[error("unsupported distribution '{0}'; aborted by operator")]
    DistroDeclined(String),

    /// Required programs are still missing after an install attempt.
    #[error("required programs still missing: {}", .0.join(", "))]
    ProgramsMissing(Vec<String>),

    /// The operator declined privilege escalation for a global install.
    #[error("global install declined")]
    EscalationDeclined,

    /// The `--user` argument does not name a usable non-root account.
    #[error("invalid user '{name}': {reason}")]
    InvalidUser { name: String, reason: String },
}

/// Errors raised by interactive prompt I/O.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Standard input was closed or the operator interrupted the prompt.
    #[error("aborted at prompt")]
    Aborted,

    /// Reading or writing the terminal failed.
    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
}
