//! Provisioning error types

use hostforge_exec::ExecError;
use thiserror::Error;

/// Errors from the provisioning sequences
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The host failed the compatibility check
    #[error("unsupported OS: {0} (Ubuntu 20.04/22.04/24.04 or Debian 11/12 required)")]
    UnsupportedHost(String),

    /// A provisioning command exited non-zero
    #[error("step '{step}' failed with exit code {code}: {stderr}")]
    StepFailed {
        /// Which step of the sequence failed
        step: &'static str,
        /// Exit code the command reported
        code: i32,
        /// Captured stderr text
        stderr: String,
    },

    /// Executor-level fault (connection, transfer)
    #[error(transparent)]
    Exec(#[from] ExecError),
}
