//! Distribution compatibility matrix

use std::sync::LazyLock;

use regex::Regex;

use crate::release::HostInfo;

/// Ubuntu ships enumerable LTS releases; the supported set is closed.
const UBUNTU_RELEASES: &[&str] = &["20.04", "22.04", "24.04"];

/// Debian stable point releases are open-ended, so 11/12 match with any
/// minor suffix.
static DEBIAN_RELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(11|12)(\.\d+)?$").expect("debian version pattern"));

impl HostInfo {
    /// Whether this host can be provisioned.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        match self.id.as_str() {
            "ubuntu" => UBUNTU_RELEASES.contains(&self.version_id.as_str()),
            "debian" => DEBIAN_RELEASE.is_match(&self.version_id),
            _ => false,
        }
    }
}
