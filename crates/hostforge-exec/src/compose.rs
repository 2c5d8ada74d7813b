//! Command rendering
//!
//! Every command, local or remote, passes through [`compose`] before it
//! touches a backend. The rendering is a pure function of its inputs so the
//! escaping rules live in exactly one place.

use std::collections::BTreeMap;

/// Quote a string for safe interpolation into a POSIX shell command line.
///
/// Harmless strings pass through untouched; everything else is wrapped in
/// single quotes, with embedded single quotes rendered as `'"'"'`.
#[must_use]
pub fn quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let plain = s.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'_' | b'@' | b'%' | b'+' | b'=' | b':' | b',' | b'.' | b'/' | b'-'
            )
    });
    if plain {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

/// Render `command` with its environment, working directory and privilege
/// settings into a single login-shell invocation.
///
/// In order: exported variable assignments (values quoted), a `cd` guard
/// (path quoted), then the whole composed string as the quoted argument of
/// `bash -lc`. With `sudo` the rendering gains only a `sudo -H ` prefix; the
/// quoted payload is byte-identical between the two forms, so the exact same
/// composed command runs with or without escalation. Metacharacters in
/// `command`, `env` values and `cwd` reach only the inner shell.
#[must_use]
pub fn compose(
    command: &str,
    env: &BTreeMap<String, String>,
    cwd: Option<&str>,
    sudo: bool,
) -> String {
    let mut full = command.to_string();
    if !env.is_empty() {
        let exports = env
            .iter()
            .map(|(k, v)| format!("{k}={}", quote(v)))
            .collect::<Vec<_>>()
            .join(" ");
        full = format!("{exports} {full}");
    }
    if let Some(dir) = cwd {
        full = format!("cd {} && {full}", quote(dir));
    }
    if sudo {
        format!("sudo -H bash -lc {}", quote(&full))
    } else {
        format!("bash -lc {}", quote(&full))
    }
}
