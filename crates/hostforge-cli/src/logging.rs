//! Logging initialization: console plus a non-blocking file writer

use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: a console layer and a file layer under
/// the directory of `log_file`.
///
/// The returned guard must stay alive for the life of the process so
/// buffered records reach the file.
pub fn init(log_file: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = log_file.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("creating log directory {}", dir.display()))?;

    let file_name = log_file
        .file_name()
        .map_or_else(|| "hostforge.log".into(), std::ffi::OsStr::to_os_string);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}
