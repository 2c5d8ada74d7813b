//! Local command execution using `tokio::process`

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::Transport;

/// Runs rendered commands on this machine through the host shell.
#[derive(Debug, Clone, Default)]
pub struct LocalSession;

impl LocalSession {
    /// Create a new local session
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LocalSession {
    #[instrument(skip(self, rendered), level = "debug")]
    async fn exec(&self, rendered: &str) -> Result<CommandResult, ExecError> {
        debug!(command = %rendered, "executing local command");

        // A shell that cannot be spawned degrades to an exit-127 result;
        // command-level problems never fail the executor itself.
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(rendered)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!(command = %rendered, error = %e, "failed to spawn shell");
                return Ok(CommandResult::spawn_failed(&e.to_string()));
            }
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        let code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(command = %rendered, code, "command completed");

        Ok(CommandResult {
            code,
            stdout,
            stderr,
        })
    }

    async fn put(&self, src: &Path, dst: &str) -> Result<(), ExecError> {
        let transfer_err = |reason: String| ExecError::Transfer {
            src: src.display().to_string(),
            dst: dst.to_string(),
            reason,
        };

        let dst_path = Path::new(dst);
        if let Some(parent) = dst_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| transfer_err(e.to_string()))?;
        }
        tokio::fs::copy(src, dst_path)
            .await
            .map_err(|e| transfer_err(e.to_string()))?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}
