//! Remote endpoint identity

use std::path::PathBuf;

/// How to authenticate against a remote host. Exactly one method per target.
#[derive(Clone)]
pub enum AuthMethod {
    /// Path to an SSH private key
    Key(PathBuf),
    /// Plain password
    Password(String),
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Key(path) => f.debug_tuple("Key").field(path).finish(),
            AuthMethod::Password(_) => f.write_str("Password(***)"),
        }
    }
}

/// A remote endpoint: address, username, port and one authentication method.
///
/// Immutable once constructed; lives for a single process invocation and is
/// never persisted.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    /// Host address (ip or name)
    pub host: String,
    /// SSH username
    pub user: String,
    /// SSH port (default 22)
    pub port: u16,
    /// Authentication method
    pub auth: AuthMethod,
}

impl RemoteTarget {
    /// Create a target on the default SSH port.
    pub fn new(host: impl Into<String>, user: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            port: 22,
            auth,
        }
    }

    /// Set a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_22() {
        let target = RemoteTarget::new("box", "root", AuthMethod::Password("pw".into()));
        assert_eq!(target.port, 22);
        assert_eq!(target.with_port(2222).port, 2222);
    }

    #[test]
    fn debug_never_leaks_the_password() {
        let target = RemoteTarget::new("box", "root", AuthMethod::Password("hunter2".into()));
        let printed = format!("{target:?}");
        assert!(!printed.contains("hunter2"));
    }
}
