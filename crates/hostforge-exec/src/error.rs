//! Error types for hostforge-exec

use thiserror::Error;

/// Faults the executor surfaces as hard failures.
///
/// A command that runs and exits non-zero is not represented here; it comes
/// back as an ordinary [`CommandResult`](crate::result::CommandResult).
/// Nothing at this layer retries.
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// The SSH session could not be established
    #[error("connection failed: {0}")]
    Connection(String),

    /// The remote host rejected the supplied credentials
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The private key could not be loaded
    #[error("SSH key error: {0}")]
    Key(String),

    /// A file transfer could not complete
    #[error("transfer failed: {src} -> {dst}: {reason}")]
    Transfer {
        /// Source path on the local machine
        src: String,
        /// Destination path on the target
        dst: String,
        /// What went wrong
        reason: String,
    },

    /// I/O fault on an established session
    #[error("I/O error: {0}")]
    Io(String),
}
