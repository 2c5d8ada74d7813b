//! Managed-site listing

use hostforge_exec::Executor;

use crate::error::ProvisionError;

/// List managed sites under `/srv/sites`, one `domain: <name>` line each.
///
/// `None` when the directory is missing or unreadable; that is an ordinary
/// non-zero exit, not a failure.
///
/// # Errors
/// Executor-level faults only.
pub async fn list_sites(ex: &Executor) -> Result<Option<String>, ProvisionError> {
    let result = ex.run("ls -1 /srv/sites | sed 's/^/domain: /'").await?;
    if !result.success() {
        return Ok(None);
    }
    Ok(Some(result.stdout))
}
