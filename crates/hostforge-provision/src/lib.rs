//! hostforge-provision: platform provisioning sequences
//!
//! Thin sequencing over the executor: package prerequisites, the Docker
//! engine, and the base directory layout. Everything here goes through
//! [`hostforge_exec::Executor`]; nothing touches a process or socket
//! directly.

mod error;
mod platform;
mod sites;

pub use error::ProvisionError;
pub use platform::{BASE_DIRS, install_platform};
pub use sites::list_sites;
