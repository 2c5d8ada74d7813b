//! hostforge-exec: command execution abstraction
//!
//! One interface for running shell commands and transferring files against
//! either the local machine or a remote host over SSH, with dry-run
//! simulation, privilege escalation and environment/working-directory
//! injection.

pub mod compose;
pub mod error;
pub mod executor;
pub mod local;
pub mod result;
pub mod ssh;
pub mod target;
pub mod traits;

pub use compose::{compose, quote};
pub use error::ExecError;
pub use executor::{ExecMode, Executor, RunOpts};
pub use result::CommandResult;
pub use target::{AuthMethod, RemoteTarget};
pub use traits::Transport;
