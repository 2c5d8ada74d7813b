//! Result types for command execution

use serde::{Deserialize, Serialize};

/// Outcome of a single command execution.
///
/// Always fully populated. A command that exits non-zero on the target is an
/// ordinary result carrying that exit code and any stderr text, never an
/// error; callers inspect the code and decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success)
    pub code: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
}

impl CommandResult {
    /// Check if the command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// The result every simulated (dry-run) operation returns.
    #[must_use]
    pub fn simulated() -> Self {
        Self {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Degraded result for a command whose shell could not be spawned.
    pub(crate) fn spawn_failed(reason: &str) -> Self {
        Self {
            code: 127,
            stdout: String::new(),
            stderr: format!("failed to spawn shell: {reason}\n"),
        }
    }

    /// Combine stdout and stderr
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}
