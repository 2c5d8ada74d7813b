//! Base platform installation: prerequisites, Docker engine, directories

use hostforge_exec::{CommandResult, Executor};
use hostforge_osinfo::HostInfo;
use tracing::{info, instrument};

use crate::error::ProvisionError;

/// Directory layout every managed host gets.
pub const BASE_DIRS: &[&str] = &[
    "/srv/sites",
    "/srv/volumes",
    "/srv/traefik",
    "/var/backups/hostforge",
    "/opt/hostforge-config",
];

const PREREQ_PACKAGES: &str = "ca-certificates curl gnupg lsb-release git ufw fail2ban";

const DOCKER_PACKAGES: &str =
    "docker-ce docker-ce-cli containerd.io docker-buildx-plugin docker-compose-plugin";

/// Install Docker, package prerequisites and the base directory layout.
///
/// Refuses hosts outside the compatibility matrix, except under dry-run
/// where nothing executes and the simulated command log is the point. Steps
/// run strictly in order; the first non-zero exit stops the sequence.
///
/// # Errors
/// [`ProvisionError::UnsupportedHost`] on a host outside the matrix,
/// [`ProvisionError::StepFailed`] on the first command that exits non-zero,
/// or a passed-through executor fault.
#[instrument(skip(ex, os), fields(os = %os.pretty_name))]
pub async fn install_platform(ex: &Executor, os: &HostInfo) -> Result<(), ProvisionError> {
    if !os.is_supported() && !ex.is_dry_run() {
        return Err(ProvisionError::UnsupportedHost(format!(
            "{} {}",
            os.id, os.version_id
        )));
    }

    info!(os = %os.pretty_name, "installing platform base");

    install_prereqs(ex).await?;
    install_docker(ex).await?;
    create_base_dirs(ex).await?;

    info!("platform base installed");
    Ok(())
}

/// Run one sudo step and turn a non-zero exit into a typed failure.
async fn step(ex: &Executor, name: &'static str, command: &str) -> Result<(), ProvisionError> {
    let result = ex.run_sudo(command).await?;
    check(name, result)
}

fn check(step: &'static str, result: CommandResult) -> Result<(), ProvisionError> {
    if result.success() {
        Ok(())
    } else {
        Err(ProvisionError::StepFailed {
            step,
            code: result.code,
            stderr: result.stderr,
        })
    }
}

async fn install_prereqs(ex: &Executor) -> Result<(), ProvisionError> {
    info!("installing package prerequisites");
    step(ex, "apt-update", "apt-get update").await?;
    step(
        ex,
        "prereq-packages",
        &format!("apt-get install -y {PREREQ_PACKAGES}"),
    )
    .await
}

async fn install_docker(ex: &Executor) -> Result<(), ProvisionError> {
    info!("installing Docker engine");
    step(ex, "docker-keyring-dir", "install -d -m 0755 /etc/apt/keyrings").await?;
    step(
        ex,
        "docker-gpg-key",
        "curl -fsSL https://download.docker.com/linux/$(. /etc/os-release; echo $ID)/gpg \
         | gpg --dearmor -o /etc/apt/keyrings/docker.gpg",
    )
    .await?;
    step(ex, "docker-gpg-perms", "chmod a+r /etc/apt/keyrings/docker.gpg").await?;
    step(
        ex,
        "docker-apt-source",
        "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/etc/apt/keyrings/docker.gpg] \
         https://download.docker.com/linux/$(. /etc/os-release; echo $ID) \
         $(. /etc/os-release; echo $VERSION_CODENAME) stable\" \
         > /etc/apt/sources.list.d/docker.list",
    )
    .await?;
    step(ex, "apt-update", "apt-get update").await?;
    step(
        ex,
        "docker-packages",
        &format!("apt-get install -y {DOCKER_PACKAGES}"),
    )
    .await?;
    step(ex, "docker-group", "usermod -aG docker $(id -un)").await
}

async fn create_base_dirs(ex: &Executor) -> Result<(), ProvisionError> {
    info!("creating base directories");
    for dir in BASE_DIRS {
        let result = ex.ensure_dir(dir, true, "0755").await?;
        check("base-dirs", result)?;
    }
    Ok(())
}
