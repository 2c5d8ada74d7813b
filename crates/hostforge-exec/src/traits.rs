//! Execution backend trait

use std::path::Path;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// One execution backend: where rendered commands run and files land.
///
/// Implementations exist for the local machine and for a remote host over
/// SSH. The command handed to [`exec`](Transport::exec) is already fully
/// rendered; backends run it verbatim and never re-quote.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a rendered command, capturing exit code, stdout and stderr.
    async fn exec(&self, rendered: &str) -> Result<CommandResult, ExecError>;

    /// Copy a local file to `dst` on the target filesystem.
    async fn put(&self, src: &Path, dst: &str) -> Result<(), ExecError>;

    /// Backend name for diagnostics.
    fn kind(&self) -> &'static str;
}
