//! The executor front: one target, one dry-run flag, every operation

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::compose::{compose, quote};
use crate::error::ExecError;
use crate::local::LocalSession;
use crate::result::CommandResult;
use crate::ssh::SshSession;
use crate::target::RemoteTarget;
use crate::traits::Transport;

/// Where an executor points. Chosen once at startup and fixed for the life
/// of the executor.
#[derive(Debug, Clone)]
pub enum ExecMode {
    /// Run directly on this machine
    Local,
    /// Run on a remote host over SSH
    Remote(RemoteTarget),
}

/// Options for [`Executor::run_with`].
#[derive(Debug, Clone, Default)]
pub struct RunOpts {
    /// Re-invoke the composed command under `sudo -H`
    pub sudo: bool,
    /// Environment variables exported to the command
    pub env: BTreeMap<String, String>,
    /// Directory the command starts in
    pub cwd: Option<String>,
}

impl RunOpts {
    /// Default options: no sudo, empty environment, no working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request privilege escalation.
    #[must_use]
    pub fn with_sudo(mut self) -> Self {
        self.sudo = true;
        self
    }

    /// Export an environment variable to the command.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run in the given directory.
    #[must_use]
    pub fn with_cwd(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Uniform command execution and file transfer against one target.
///
/// The backend is selected at construction from the [`ExecMode`]; call sites
/// never branch on where they run. With `dry_run` set every operation is
/// logged and simulated: no process spawned, no socket opened, no file
/// written, and `run` still returns a well-formed success result.
pub struct Executor {
    transport: Box<dyn Transport>,
    dry_run: bool,
}

impl Executor {
    /// Build an executor for the given mode.
    #[must_use]
    pub fn new(mode: ExecMode, dry_run: bool) -> Self {
        let transport: Box<dyn Transport> = match mode {
            ExecMode::Local => Box::new(LocalSession::new()),
            ExecMode::Remote(target) => Box::new(SshSession::new(target)),
        };
        Self { transport, dry_run }
    }

    /// Executor for the local machine.
    #[must_use]
    pub fn local(dry_run: bool) -> Self {
        Self::new(ExecMode::Local, dry_run)
    }

    /// Executor for a remote host.
    #[must_use]
    pub fn remote(target: RemoteTarget, dry_run: bool) -> Self {
        Self::new(ExecMode::Remote(target), dry_run)
    }

    /// Executor over a caller-supplied backend. Useful for doubles in tests
    /// of code layered on the executor.
    #[must_use]
    pub fn with_transport(transport: Box<dyn Transport>, dry_run: bool) -> Self {
        Self { transport, dry_run }
    }

    /// Whether this executor simulates instead of executing.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a command with default options.
    ///
    /// # Errors
    /// Only connection-level faults error; the command's own exit code comes
    /// back in the result.
    pub async fn run(&self, command: &str) -> Result<CommandResult, ExecError> {
        self.run_with(command, &RunOpts::new()).await
    }

    /// Run a command under sudo.
    ///
    /// # Errors
    /// Same contract as [`run`](Executor::run).
    pub async fn run_sudo(&self, command: &str) -> Result<CommandResult, ExecError> {
        self.run_with(command, &RunOpts::new().with_sudo()).await
    }

    /// Run a command with explicit sudo/env/cwd settings.
    ///
    /// # Errors
    /// Only connection-level faults error; the command's own exit code comes
    /// back in the result.
    pub async fn run_with(
        &self,
        command: &str,
        opts: &RunOpts,
    ) -> Result<CommandResult, ExecError> {
        let rendered = compose(command, &opts.env, opts.cwd.as_deref(), opts.sudo);
        debug!(
            backend = self.transport.kind(),
            dry_run = self.dry_run,
            command = %rendered,
            "EXEC"
        );
        if self.dry_run {
            return Ok(CommandResult::simulated());
        }
        self.transport.exec(&rendered).await
    }

    /// Copy a local file onto the target filesystem.
    ///
    /// # Errors
    /// An unreadable source or unwritable destination is a hard
    /// [`ExecError::Transfer`]; there is no partial-success representation
    /// for a copy.
    pub async fn put(&self, src: impl AsRef<Path>, dst: &str) -> Result<(), ExecError> {
        let src = src.as_ref();
        debug!(
            backend = self.transport.kind(),
            dry_run = self.dry_run,
            src = %src.display(),
            dst = %dst,
            "PUT"
        );
        if self.dry_run {
            return Ok(());
        }
        self.transport.put(src, dst).await
    }

    /// True iff `path` exists on the target.
    ///
    /// # Errors
    /// Connection-level faults only.
    pub async fn exists(&self, path: &str) -> Result<bool, ExecError> {
        let result = self.run(&format!("test -e {}", quote(path))).await?;
        Ok(result.success())
    }

    /// Create a directory (and parents) with the given permission mode.
    ///
    /// # Errors
    /// Connection-level faults only; inspect the result for the exit code.
    pub async fn ensure_dir(
        &self,
        path: &str,
        sudo: bool,
        mode: &str,
    ) -> Result<CommandResult, ExecError> {
        let opts = RunOpts {
            sudo,
            ..RunOpts::new()
        };
        self.run_with(&format!("install -d -m {mode} {}", quote(path)), &opts)
            .await
    }

    /// Write literal text to `path` with the permission mode applied at
    /// creation.
    ///
    /// The content travels through the command channel itself, so the same
    /// path works locally and over SSH, and it round-trips exactly,
    /// embedded single quotes and newlines included.
    ///
    /// # Errors
    /// Connection-level faults only; inspect the result for the exit code.
    pub async fn write_file(
        &self,
        path: &str,
        content: &str,
        sudo: bool,
        mode: &str,
    ) -> Result<CommandResult, ExecError> {
        let opts = RunOpts {
            sudo,
            ..RunOpts::new()
        };
        let cmd = format!(
            "printf %s {} | install -m {mode} /dev/stdin {}",
            quote(content),
            quote(path)
        );
        self.run_with(&cmd, &opts).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    /// Records every rendered command; never touches a process.
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingTransport {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn exec(&self, rendered: &str) -> Result<CommandResult, ExecError> {
            self.calls.lock().unwrap().push(rendered.to_string());
            Ok(CommandResult {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        async fn put(&self, src: &Path, dst: &str) -> Result<(), ExecError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("PUT {} {dst}", src.display()));
            Ok(())
        }

        fn kind(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn dry_run_simulates_without_touching_the_backend() {
        let (transport, calls) = RecordingTransport::new();
        let ex = Executor::with_transport(Box::new(transport), true);

        let result = ex.run("apt-get dist-upgrade -y").await.unwrap();
        assert_eq!(result.code, 0);
        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "");

        ex.put("/etc/hosts", "/tmp/hosts").await.unwrap();

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dry_run_put_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        std::fs::write(&src, b"data").unwrap();
        let dst = dir.path().join("dst.txt");

        let ex = Executor::local(true);
        ex.put(&src, dst.to_str().unwrap()).await.unwrap();

        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn run_hands_the_rendered_command_to_the_backend() {
        let (transport, calls) = RecordingTransport::new();
        let ex = Executor::with_transport(Box::new(transport), false);

        ex.run_sudo("apt-get update").await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["sudo -H bash -lc 'apt-get update'"]);
    }

    #[tokio::test]
    async fn env_values_with_metacharacters_do_not_inject() {
        let ex = Executor::local(false);
        let tricky = r#"it's; $HOME `id` "x""#;
        let opts = RunOpts::new().with_env("GREETING", tricky);

        let result = ex.run_with("printenv GREETING", &opts).await.unwrap();

        assert!(result.success(), "stderr: {}", result.stderr);
        assert_eq!(result.stdout, format!("{tricky}\n"));
    }

    #[tokio::test]
    async fn cwd_with_metacharacters_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let tricky = dir.path().join("has space; $x");
        std::fs::create_dir(&tricky).unwrap();

        let ex = Executor::local(false);
        let opts = RunOpts::new().with_cwd(tricky.to_str().unwrap());

        let result = ex.run_with("pwd", &opts).await.unwrap();

        assert!(result.success(), "stderr: {}", result.stderr);
        assert_eq!(result.stdout.trim_end(), tricky.to_str().unwrap());
    }

    #[tokio::test]
    async fn exists_reflects_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, b"x").unwrap();

        let ex = Executor::local(false);
        assert!(ex.exists(present.to_str().unwrap()).await.unwrap());
        assert!(
            !ex.exists(dir.path().join("absent").to_str().unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn ensure_dir_applies_the_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/created");

        let ex = Executor::local(false);
        let result = ex
            .ensure_dir(target.to_str().unwrap(), false, "0750")
            .await
            .unwrap();

        assert!(result.success(), "stderr: {}", result.stderr);
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[tokio::test]
    async fn write_file_round_trips_awkward_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        let content = "line one\nit's got 'quotes'\n$VAR `cmd` \\ end";

        let ex = Executor::local(false);
        let result = ex
            .write_file(path.to_str().unwrap(), content, false, "0644")
            .await
            .unwrap();
        assert!(result.success(), "stderr: {}", result.stderr);

        let read_back = ex
            .run(&format!("cat {}", quote(path.to_str().unwrap())))
            .await
            .unwrap();
        assert_eq!(read_back.stdout, content);

        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn dry_run_write_file_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.txt");

        let ex = Executor::local(true);
        let result = ex
            .write_file(path.to_str().unwrap(), "content", false, "0644")
            .await
            .unwrap();

        assert!(result.success());
        assert!(!path.exists());
    }
}
