//! /etc/os-release parsing

use serde::{Deserialize, Serialize};

/// Identity of an inspected host, straight out of `/etc/os-release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Distribution id (`ubuntu`, `debian`, ...)
    pub id: String,
    /// Version identifier (`22.04`, `12`, ...)
    pub version_id: String,
    /// Human-readable name
    pub pretty_name: String,
}

/// Parse os-release text: one `KEY=VALUE` per line, values optionally
/// double-quoted, lines without `=` ignored. Missing keys come back as
/// empty strings, never as a parse failure.
#[must_use]
pub fn parse_os_release(text: &str) -> HostInfo {
    let mut info = HostInfo {
        id: String::new(),
        version_id: String::new(),
        pretty_name: String::new(),
    };

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key {
            "ID" => info.id = value.to_string(),
            "VERSION_ID" => info.version_id = value.to_string(),
            "PRETTY_NAME" => info.pretty_name = value.to_string(),
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_typical_ubuntu_release() {
        let text = "ID=ubuntu\nVERSION_ID=\"22.04\"\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"";
        let info = parse_os_release(text);

        assert_eq!(info.id, "ubuntu");
        assert_eq!(info.version_id, "22.04");
        assert_eq!(info.pretty_name, "Ubuntu 22.04.3 LTS");
    }

    #[test]
    fn missing_keys_become_empty_strings() {
        let info = parse_os_release("ID=debian\n");

        assert_eq!(info.id, "debian");
        assert_eq!(info.version_id, "");
        assert_eq!(info.pretty_name, "");
    }

    #[test]
    fn lines_without_equals_are_ignored() {
        let text = "garbage line\nID=debian\n# comment\nVERSION_ID=12";
        let info = parse_os_release(text);

        assert_eq!(info.id, "debian");
        assert_eq!(info.version_id, "12");
    }

    #[test]
    fn unquoted_values_pass_through() {
        let info = parse_os_release("ID=fedora\nVERSION_ID=38");

        assert_eq!(info.id, "fedora");
        assert_eq!(info.version_id, "38");
    }
}
