//! Distro detection from os-release identification fields.
//!
//! Detection never fails: absent or malformed identification data yields
//! [`DistroFamily::Unknown`], which routes selection to the AppImage
//! fallback. The installer has to run on arbitrary Linux hosts, so this
//! module degrades instead of erroring.

use std::fmt;
use std::fs;
use std::path::Path;

const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

const DEBIAN_TOKENS: [&str; 7] = [
    "debian",
    "ubuntu",
    "mint",
    "linuxmint",
    "pop",
    "elementary",
    "raspbian",
];

const REDHAT_TOKENS: [&str; 7] = [
    "fedora", "rhel", "centos", "rocky", "alma", "almalinux", "redhat",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    Debian,
    RedHat,
    Unknown,
}

impl fmt::Display for DistroFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistroFamily::Debian => "Debian-like",
            DistroFamily::RedHat => "RedHat-like",
            DistroFamily::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// The `ID=` and `ID_LIKE=` fields of an os-release file, lowercased and
/// unquoted. `ID_LIKE` keeps its declared order.
#[derive(Debug, Clone, Default)]
pub struct OsRelease {
    pub id: Option<String>,
    pub id_like: Vec<String>,
}

impl OsRelease {
    pub fn parse(contents: &str) -> Self {
        let mut os_release = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("ID=") {
                let value = unquote(value).to_lowercase();
                if !value.is_empty() {
                    os_release.id = Some(value);
                }
            } else if let Some(value) = line.strip_prefix("ID_LIKE=") {
                os_release.id_like = unquote(value)
                    .to_lowercase()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
            }
        }
        os_release
    }

    /// Read the conventional os-release locations, first hit wins.
    /// Unreadable or absent files yield empty identification data.
    pub fn load() -> Self {
        for path in OS_RELEASE_PATHS {
            if let Ok(contents) = fs::read_to_string(Path::new(path)) {
                log::debug!("read OS identification from {path}");
                return Self::parse(&contents);
            }
        }
        log::debug!("no os-release file found");
        Self::default()
    }

    fn tokens(&self) -> impl Iterator<Item = &str> {
        self.id.as_deref().into_iter().chain(
            self.id_like.iter().map(String::as_str),
        )
    }
}

/// Classify identification fields into a family. The id and id-like values
/// are checked against Debian tokens first, then RedHat tokens; anything
/// else is Unknown.
pub fn classify(os_release: &OsRelease) -> DistroFamily {
    if os_release.tokens().any(|t| DEBIAN_TOKENS.contains(&t)) {
        return DistroFamily::Debian;
    }
    if os_release.tokens().any(|t| REDHAT_TOKENS.contains(&t)) {
        return DistroFamily::RedHat;
    }
    DistroFamily::Unknown
}

pub fn detect() -> DistroFamily {
    let os_release = OsRelease::load();
    let family = classify(&os_release);
    log::info!(
        "detected distro family {family} (id={:?}, id_like={:?})",
        os_release.id,
        os_release.id_like
    );
    family
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(id: Option<&str>, id_like: &[&str]) -> OsRelease {
        OsRelease {
            id: id.map(str::to_string),
            id_like: id_like.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_classify_debian_ids() {
        for id in ["debian", "ubuntu", "mint", "pop", "raspbian"] {
            assert_eq!(classify(&os(Some(id), &[])), DistroFamily::Debian, "{id}");
        }
    }

    #[test]
    fn test_classify_redhat_ids() {
        for id in ["fedora", "rhel", "centos", "rocky", "alma"] {
            assert_eq!(classify(&os(Some(id), &[])), DistroFamily::RedHat, "{id}");
        }
    }

    #[test]
    fn test_classify_unknown_id() {
        assert_eq!(classify(&os(Some("arch"), &[])), DistroFamily::Unknown);
        assert_eq!(classify(&os(Some("gentoo"), &[])), DistroFamily::Unknown);
        assert_eq!(classify(&os(None, &[])), DistroFamily::Unknown);
    }

    #[test]
    fn test_classify_id_like_fallback() {
        // KDE neon identifies as its own distro but is ubuntu/debian-like
        assert_eq!(
            classify(&os(Some("neon"), &["ubuntu", "debian"])),
            DistroFamily::Debian
        );
        assert_eq!(
            classify(&os(Some("ol"), &["fedora"])),
            DistroFamily::RedHat
        );
    }

    #[test]
    fn test_classify_debian_beats_redhat() {
        // Priority order: a Debian token anywhere wins over RedHat tokens
        assert_eq!(
            classify(&os(Some("fedora"), &["debian"])),
            DistroFamily::Debian
        );
    }

    #[test]
    fn test_parse_plain_fields() {
        let parsed = OsRelease::parse("NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n");
        assert_eq!(parsed.id.as_deref(), Some("ubuntu"));
        assert_eq!(parsed.id_like, vec!["debian"]);
    }

    #[test]
    fn test_parse_quoted_multi_value_id_like() {
        let parsed = OsRelease::parse("ID=neon\nID_LIKE=\"ubuntu debian\"\n");
        assert_eq!(parsed.id.as_deref(), Some("neon"));
        assert_eq!(parsed.id_like, vec!["ubuntu", "debian"]);
    }

    #[test]
    fn test_parse_uppercase_values_are_lowercased() {
        let parsed = OsRelease::parse("ID=\"Fedora\"\n");
        assert_eq!(parsed.id.as_deref(), Some("fedora"));
    }

    #[test]
    fn test_parse_garbage_degrades_to_empty() {
        let parsed = OsRelease::parse("complete nonsense\n\n===\n");
        assert_eq!(parsed.id, None);
        assert!(parsed.id_like.is_empty());
        assert_eq!(classify(&parsed), DistroFamily::Unknown);
    }
}
