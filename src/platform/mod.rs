//! Host capability probing: package-manager discovery, privilege and FUSE
//! checks, sudo wrapping.

use crate::error::{InstillError, Result};
use crate::executor::CommandSpec;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const FUSE_DEVICE: &str = "/dev/fuse";

/// Everything the install executor needs to know about the host, probed
/// once so the plan logic stays a pure function over this snapshot.
#[derive(Debug, Clone, Default)]
pub struct ToolProbe {
    pub apt_get: Option<PathBuf>,
    pub dpkg: Option<PathBuf>,
    pub dnf: Option<PathBuf>,
    pub zypper: Option<PathBuf>,
    pub rpm: Option<PathBuf>,
    pub sudo: Option<PathBuf>,
    pub fuse: bool,
    pub root: bool,
}

impl ToolProbe {
    pub fn detect() -> Self {
        Self {
            apt_get: which::which("apt-get").ok(),
            dpkg: which::which("dpkg").ok(),
            dnf: which::which("dnf").ok(),
            zypper: which::which("zypper").ok(),
            rpm: which::which("rpm").ok(),
            sudo: which::which("sudo").ok(),
            fuse: Path::new(FUSE_DEVICE).exists(),
            root: is_root(),
        }
    }

    /// Wrap a command with sudo unless we already run as root. Package
    /// installs require elevated privilege; without root or sudo there is
    /// no way to proceed.
    pub fn elevate(&self, spec: CommandSpec) -> Result<CommandSpec> {
        if self.root {
            return Ok(spec);
        }
        match &self.sudo {
            Some(sudo) => Ok(spec.elevated_via(sudo)),
            None => Err(InstillError::PermissionDenied(
                "package installation requires root and no sudo was found in PATH".to_string(),
            )),
        }
    }
}

pub fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

/// AppImages frequently lose their executable bit in transit; restore it
/// before direct execution.
pub fn ensure_executable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)?;
    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & 0o111 == 0 {
        permissions.set_mode(mode | 0o755);
        fs::set_permissions(path, permissions)?;
        log::debug!("set executable bit on {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_elevate_passthrough_when_root() {
        let probe = ToolProbe {
            root: true,
            ..Default::default()
        };
        let spec = CommandSpec::new("/usr/bin/apt-get").arg("install");
        let elevated = probe.elevate(spec).unwrap();
        assert_eq!(elevated.program(), Path::new("/usr/bin/apt-get"));
    }

    #[test]
    fn test_elevate_wraps_with_sudo() {
        let probe = ToolProbe {
            sudo: Some(PathBuf::from("/usr/bin/sudo")),
            ..Default::default()
        };
        let spec = CommandSpec::new("/usr/bin/apt-get").arg("install");
        let elevated = probe.elevate(spec).unwrap();
        assert_eq!(elevated.program(), Path::new("/usr/bin/sudo"));
        assert_eq!(
            elevated.display_line(),
            "/usr/bin/sudo /usr/bin/apt-get install"
        );
    }

    #[test]
    fn test_elevate_without_root_or_sudo_is_denied() {
        let probe = ToolProbe::default();
        let spec = CommandSpec::new("/usr/bin/apt-get");
        let err = probe.elevate(spec).unwrap_err();
        assert!(matches!(err, InstillError::PermissionDenied(_)));
    }

    #[test]
    fn test_ensure_executable_sets_missing_bit() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"#!/bin/sh\n").unwrap();
        temp_file.flush().unwrap();

        let mut permissions = fs::metadata(temp_file.path()).unwrap().permissions();
        permissions.set_mode(0o644);
        fs::set_permissions(temp_file.path(), permissions).unwrap();

        ensure_executable(temp_file.path()).unwrap();
        let mode = fs::metadata(temp_file.path()).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}
