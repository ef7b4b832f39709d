//! Bundle layout: the artifact set under `artifacts/` and its digest
//! entries under `checksums/`.

use crate::error::{InstillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ARTIFACTS_DIR: &str = "artifacts";
pub const CHECKSUMS_DIR: &str = "checksums";
pub const LOGS_DIR: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStrategy {
    Deb,
    Rpm,
    AppImage,
}

impl InstallStrategy {
    pub const ALL: [InstallStrategy; 3] = [
        InstallStrategy::Deb,
        InstallStrategy::Rpm,
        InstallStrategy::AppImage,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            InstallStrategy::Deb => "deb",
            InstallStrategy::Rpm => "rpm",
            InstallStrategy::AppImage => "AppImage",
        }
    }

    /// Suffix of the corresponding `--force-*` flag.
    pub fn flag_name(&self) -> &'static str {
        match self {
            InstallStrategy::Deb => "deb",
            InstallStrategy::Rpm => "rpm",
            InstallStrategy::AppImage => "appimage",
        }
    }

    fn matches_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case(self.extension()))
            .unwrap_or(false)
    }
}

impl FromStr for InstallStrategy {
    type Err = InstillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deb" => Ok(InstallStrategy::Deb),
            "rpm" => Ok(InstallStrategy::Rpm),
            "appimage" => Ok(InstallStrategy::AppImage),
            _ => Err(InstillError::ConfigurationError(format!(
                "unknown install strategy: {s}"
            ))),
        }
    }
}

impl fmt::Display for InstallStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStrategy::Deb => "deb",
            InstallStrategy::Rpm => "rpm",
            InstallStrategy::AppImage => "AppImage",
        };
        write!(f, "{name}")
    }
}

/// One installable file in the bundle, paired with its recorded digest.
/// `expected_checksum` is `None` when no digest entry was found; the
/// verifier fails closed on that.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub expected_checksum: Option<String>,
    pub strategy: InstallStrategy,
}

impl Artifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug)]
pub struct Bundle {
    root: PathBuf,
    artifacts: BTreeMap<InstallStrategy, Artifact>,
}

impl Bundle {
    /// Scan a bundle directory. Fails only on a structurally unusable
    /// bundle (no `artifacts/` directory); per-strategy problems such as
    /// duplicate or missing files merely make that strategy unselectable.
    pub fn load(root: &Path) -> Result<Self> {
        let artifacts_dir = root.join(ARTIFACTS_DIR);
        if !artifacts_dir.is_dir() {
            return Err(InstillError::InvalidBundle(format!(
                "no {ARTIFACTS_DIR}/ directory under {}",
                root.display()
            )));
        }

        let mut by_strategy: BTreeMap<InstallStrategy, Vec<PathBuf>> = BTreeMap::new();
        for entry in fs::read_dir(&artifacts_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(strategy) = InstallStrategy::ALL
                .iter()
                .find(|s| s.matches_file(&path))
            {
                by_strategy.entry(*strategy).or_default().push(path);
            } else {
                log::debug!("ignoring unrecognized file in bundle: {}", path.display());
            }
        }

        let mut artifacts = BTreeMap::new();
        for (strategy, mut paths) in by_strategy {
            if paths.len() > 1 {
                paths.sort();
                log::warn!(
                    "bundle ships {} {strategy} artifacts, expected exactly one; {strategy} is \
                     not selectable",
                    paths.len()
                );
                continue;
            }
            let path = paths.remove(0);
            let expected_checksum = read_checksum_entry(root, &path);
            artifacts.insert(
                strategy,
                Artifact {
                    path,
                    expected_checksum,
                    strategy,
                },
            );
        }

        Ok(Self {
            root: root.to_path_buf(),
            artifacts,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn artifact(&self, strategy: InstallStrategy) -> Option<&Artifact> {
        self.artifacts.get(&strategy)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Look up `checksums/<file-name>.sha256` for an artifact. The entry's
/// first whitespace-separated token must be a 64-digit hex digest; the
/// `sha256sum` output format ("<digest>  <name>") is accepted as-is.
fn read_checksum_entry(root: &Path, artifact_path: &Path) -> Option<String> {
    let file_name = artifact_path.file_name()?.to_string_lossy().into_owned();
    let entry_path = root.join(CHECKSUMS_DIR).join(format!("{file_name}.sha256"));
    let contents = match fs::read_to_string(&entry_path) {
        Ok(contents) => contents,
        Err(err) => {
            log::debug!("no checksum entry at {}: {err}", entry_path.display());
            return None;
        }
    };
    match parse_checksum_entry(&contents) {
        Some(digest) => Some(digest),
        None => {
            log::warn!("malformed checksum entry at {}", entry_path.display());
            None
        }
    }
}

pub(crate) fn parse_checksum_entry(contents: &str) -> Option<String> {
    let token = contents
        .lines()
        .find(|line| !line.trim().is_empty())?
        .split_whitespace()
        .next()?;
    if token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(token.to_string())
    } else {
        None
    }
}
