//! hostforge CLI
//!
//! Provisions a single host, locally or over SSH, with the base platform
//! stack: OS check, package prerequisites, Docker engine, base directories.

mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{bail, eyre};
use hostforge_exec::{AuthMethod, Executor, RemoteTarget};
use hostforge_osinfo::detect;
use hostforge_provision::{install_platform, list_sites};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "hostforge")]
#[command(about = "Provision a single host with the base platform stack", long_about = None)]
struct Cli {
    /// Run on the local host
    #[arg(long)]
    local: bool,

    /// Run via SSH on a remote host
    #[arg(long, conflicts_with = "local")]
    remote: bool,

    /// Remote host (ip or name)
    #[arg(long)]
    host: Option<String>,

    /// SSH username
    #[arg(long)]
    ssh_user: Option<String>,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    ssh_port: u16,

    /// Path to SSH private key
    #[arg(long)]
    ssh_key: Option<PathBuf>,

    /// SSH password (discouraged); prompted for when neither key nor
    /// password is given
    #[arg(long)]
    ssh_pass: Option<String>,

    /// Print actions without executing
    #[arg(long)]
    dry_run: bool,

    /// Assume yes for confirmations
    #[arg(long)]
    yes: bool,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,

    /// Log file location
    #[arg(long, default_value = "/var/log/hostforge/hostforge.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install Docker, package prerequisites and base directories
    InstallPlatform,
    /// List managed sites
    ListSites,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let _guard = logging::init(&cli.log_file, cli.verbose)?;

    let executor = build_executor(&cli)?;

    match cli.command {
        Commands::InstallPlatform => cmd_install_platform(&executor, &cli).await,
        Commands::ListSites => cmd_list_sites(&executor).await,
    }
}

/// One executor per invocation: local unless `--remote` is given.
fn build_executor(cli: &Cli) -> Result<Executor> {
    if !cli.remote {
        debug!(explicit = cli.local, "using local executor");
        return Ok(Executor::local(cli.dry_run));
    }

    let host = cli
        .host
        .clone()
        .ok_or_else(|| eyre!("--remote requires --host"))?;
    let user = cli
        .ssh_user
        .clone()
        .ok_or_else(|| eyre!("--remote requires --ssh-user"))?;

    let auth = match (&cli.ssh_key, &cli.ssh_pass) {
        (Some(key), _) => AuthMethod::Key(key.clone()),
        (None, Some(password)) => AuthMethod::Password(password.clone()),
        (None, None) => AuthMethod::Password(prompt_password()?),
    };

    let target = RemoteTarget::new(host, user, auth).with_port(cli.ssh_port);
    info!(host = %target.host, port = target.port, "targeting remote host");
    Ok(Executor::remote(target, cli.dry_run))
}

fn prompt_password() -> Result<String> {
    let password = dialoguer::Password::new()
        .with_prompt("SSH password")
        .interact()?;
    Ok(password)
}

async fn cmd_install_platform(ex: &Executor, cli: &Cli) -> Result<()> {
    let Some(os) = detect(ex).await? else {
        bail!("could not read /etc/os-release on the target");
    };

    if os.pretty_name.is_empty() {
        println!("Detected OS: unknown (simulated run)");
    } else {
        println!("Detected OS: {}", os.pretty_name);
    }

    if !cli.yes && !cli.dry_run {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Install the platform base on this host?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    install_platform(ex, &os).await?;

    println!(
        "Platform base installed. Traefik and security stack installation \
         will follow in subsequent steps."
    );
    Ok(())
}

async fn cmd_list_sites(ex: &Executor) -> Result<()> {
    match list_sites(ex).await? {
        Some(listing) => println!("{listing}"),
        None => println!("No sites or cannot access /srv/sites"),
    }
    Ok(())
}
