//! SSH command execution using russh crate

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use russh::keys::ssh_key;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key};
use russh::{ChannelMsg, client};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::compose::quote;
use crate::error::ExecError;
use crate::result::CommandResult;
use crate::target::{AuthMethod, RemoteTarget};
use crate::traits::Transport;

/// SSH client handler for russh
#[derive(Debug)]
struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Accept all server keys (like StrictHostKeyChecking=no)
        Ok(true)
    }
}

/// Remote session over SSH.
///
/// The underlying session is established on the first operation and reused
/// for every subsequent one: a single cached slot, owned exclusively by this
/// value, never shared across executors. A failed establishment leaves the
/// slot empty; the next call attempts again and fails the same way until the
/// caller rebuilds the executor.
pub struct SshSession {
    /// Endpoint and credentials
    target: RemoteTarget,
    /// SSH session (initialized on first use)
    session: Mutex<Option<client::Handle<SshClientHandler>>>,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("target", &self.target)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl SshSession {
    /// Create a session bound to `target`. Nothing connects until the first
    /// operation.
    #[must_use]
    pub fn new(target: RemoteTarget) -> Self {
        Self {
            target,
            session: Mutex::new(None),
        }
    }

    /// The endpoint this session talks to.
    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    /// Whether a session handle is currently cached.
    pub fn is_connected(&self) -> bool {
        self.session.try_lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Establish and authenticate the session unless already cached.
    #[instrument(skip(self), fields(host = %self.target.host))]
    async fn connect(&self) -> Result<(), ExecError> {
        let mut slot = self.session.lock().await;

        if slot.is_some() {
            return Ok(());
        }

        info!(
            host = %self.target.host,
            port = self.target.port,
            user = %self.target.user,
            "connecting to SSH"
        );

        let config = Arc::new(client::Config::default());

        let mut session = client::connect(
            config,
            (&self.target.host[..], self.target.port),
            SshClientHandler,
        )
        .await
        .map_err(|e| ExecError::Connection(e.to_string()))?;

        match &self.target.auth {
            AuthMethod::Key(path) => {
                let key_pair =
                    load_secret_key(path, None).map_err(|e| ExecError::Key(e.to_string()))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .ok()
                    .flatten()
                    .flatten();
                let auth_res = session
                    .authenticate_publickey(
                        &self.target.user,
                        PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg),
                    )
                    .await
                    .map_err(|e| ExecError::Auth(e.to_string()))?;

                if !auth_res.success() {
                    return Err(ExecError::Auth(
                        "public key authentication rejected".to_string(),
                    ));
                }
            }
            AuthMethod::Password(password) => {
                let auth_res = session
                    .authenticate_password(&self.target.user, password)
                    .await
                    .map_err(|e| ExecError::Auth(e.to_string()))?;

                if !auth_res.success() {
                    return Err(ExecError::Auth(
                        "password authentication rejected".to_string(),
                    ));
                }
            }
        }

        info!(host = %self.target.host, "SSH connected and authenticated");

        *slot = Some(session);
        Ok(())
    }

    /// Execute a rendered command on the remote host
    #[instrument(skip(self, cmd), fields(host = %self.target.host))]
    async fn execute_remote(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let mut slot = self.session.lock().await;
        let session = slot
            .as_mut()
            .ok_or_else(|| ExecError::Connection("not connected".to_string()))?;

        debug!(command = %cmd, "executing remote command");

        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        channel
            .exec(true, cmd)
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        let mut code = -1;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                    stderr.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    code = exit_status.cast_signed();
                }
                Some(ChannelMsg::Eof) | None => break,
                _ => {}
            }
        }

        debug!(command = %cmd, code, "remote command completed");

        Ok(CommandResult {
            code,
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }

    /// Stream a local file to the remote path over the cached session.
    #[instrument(skip(self), fields(host = %self.target.host))]
    async fn upload(&self, src: &Path, dst: &str) -> Result<(), ExecError> {
        let transfer_err = |reason: String| ExecError::Transfer {
            src: src.display().to_string(),
            dst: dst.to_string(),
            reason,
        };

        let bytes = tokio::fs::read(src)
            .await
            .map_err(|e| transfer_err(e.to_string()))?;

        let mut slot = self.session.lock().await;
        let session = slot
            .as_mut()
            .ok_or_else(|| ExecError::Connection("not connected".to_string()))?;

        debug!(src = %src.display(), dst = %dst, bytes = bytes.len(), "uploading file");

        // The exec channel is the transfer pipe: write the bytes into a
        // remote `cat` and read back its exit status.
        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        channel
            .exec(true, format!("cat > {}", quote(dst)))
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        channel
            .data(&bytes[..])
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;
        channel
            .eof()
            .await
            .map_err(|e| ExecError::Io(e.to_string()))?;

        let mut code = -1;
        let mut stderr = Vec::new();

        loop {
            match channel.wait().await {
                Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                    stderr.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    code = exit_status.cast_signed();
                }
                Some(ChannelMsg::Eof) | None => break,
                _ => {}
            }
        }

        if code != 0 {
            return Err(transfer_err(format!(
                "remote write exited {code}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        debug!(dst = %dst, "upload completed");
        Ok(())
    }
}

#[async_trait]
impl Transport for SshSession {
    async fn exec(&self, rendered: &str) -> Result<CommandResult, ExecError> {
        self.connect().await?;
        self.execute_remote(rendered).await
    }

    async fn put(&self, src: &Path, dst: &str) -> Result<(), ExecError> {
        self.connect().await?;
        self.upload(src, dst).await
    }

    fn kind(&self) -> &'static str {
        "ssh"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_disconnected() {
        let target = RemoteTarget::new("127.0.0.1", "root", AuthMethod::Password("pw".into()));
        let session = SshSession::new(target);
        assert!(!session.is_connected());
    }

    // Live tests require an SSH server.
    #[tokio::test]
    #[ignore = "requires SSH server"]
    async fn exec_reuses_one_session_across_calls() {
        let target = RemoteTarget::new("127.0.0.1", "root", AuthMethod::Password("pw".into()));
        let session = SshSession::new(target);

        session.exec("true").await.unwrap();
        assert!(session.is_connected());
        session.exec("true").await.unwrap();
    }
}
