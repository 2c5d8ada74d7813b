//! hostforge-osinfo: OS fingerprinting and the compatibility matrix
//!
//! Issues one `cat /etc/os-release` through the executor, parses the
//! KEY=VALUE payload and classifies the host against the supported
//! distribution set.

mod release;
mod support;

pub use release::{HostInfo, parse_os_release};

use hostforge_exec::{ExecError, Executor};
use tracing::debug;

/// Inspect the target behind `executor`.
///
/// Recomputed on every call; nothing is cached. Returns `Ok(None)` when
/// `/etc/os-release` cannot be read: absence is the caller's decision to
/// handle, not an error.
///
/// # Errors
/// Connection-level faults propagate from the executor.
pub async fn detect(executor: &Executor) -> Result<Option<HostInfo>, ExecError> {
    let result = executor.run("cat /etc/os-release").await?;
    if !result.success() {
        debug!(code = result.code, "os-release not readable");
        return Ok(None);
    }
    Ok(Some(parse_os_release(&result.stdout)))
}
