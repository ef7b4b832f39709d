//! Install executor: plans the strategy-specific mechanism command and
//! runs it under dry-run/real-run modes.

mod runner;

pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};

use crate::bundle::{Artifact, InstallStrategy};
use crate::config::RunConfig;
use crate::error::{InstillError, Result};
use crate::platform::{self, ToolProbe};
use crate::session::SessionLog;
use std::path::Path;
use std::time::Duration;

pub struct InstallExecutor<'a> {
    runner: &'a dyn CommandRunner,
    session: &'a SessionLog,
    probe: ToolProbe,
}

impl<'a> InstallExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, session: &'a SessionLog, probe: ToolProbe) -> Self {
        Self {
            runner,
            session,
            probe,
        }
    }

    /// Run the mechanism for the selected strategy. Dry-run logs the exact
    /// command line (sudo wrapper included) and succeeds without touching
    /// the system. Non-zero exit becomes `InstallFailure`; the runner maps
    /// timeout and interrupt to their own variants. No retries here:
    /// retrying is a user decision, made by re-invoking with a forced
    /// strategy.
    pub fn execute(
        &self,
        artifact: &Artifact,
        run: &RunConfig,
        timeout: Duration,
    ) -> Result<()> {
        let spec = plan(artifact.strategy, &artifact.path, &self.probe)?;
        self.session.info(&format!(
            "install command for {}: {}",
            artifact.strategy,
            spec.display_line()
        ));

        if run.dry_run {
            self.session
                .info("dry-run: command not executed, no system changes made");
            println!("dry-run: would execute: {}", spec.display_line());
            return Ok(());
        }

        if artifact.strategy == InstallStrategy::AppImage {
            platform::ensure_executable(&artifact.path)?;
        }

        self.session.info(&format!(
            "executing installer (timeout {}s)",
            timeout.as_secs()
        ));
        let output = self.runner.run(&spec, timeout, run.verbose)?;

        if output.success() {
            self.session.info("install mechanism completed successfully");
            return Ok(());
        }

        for line in &output.tail {
            self.session.error(&format!("installer output: {line}"));
        }
        Err(InstillError::InstallFailure {
            exit_code: output.exit_code,
            output_tail: output.tail,
        })
    }
}

/// Resolve the mechanism command for a strategy against a host probe.
/// Pure over the probe snapshot, so it is directly testable.
pub fn plan(
    strategy: InstallStrategy,
    artifact_path: &Path,
    probe: &ToolProbe,
) -> Result<CommandSpec> {
    match strategy {
        InstallStrategy::Deb => {
            let spec = if let Some(apt_get) = &probe.apt_get {
                // apt-get resolves dependencies from the local file
                CommandSpec::new(apt_get)
                    .args(["install", "-y"])
                    .arg(artifact_path)
            } else if let Some(dpkg) = &probe.dpkg {
                CommandSpec::new(dpkg).arg("-i").arg(artifact_path)
            } else {
                return Err(InstillError::MechanismUnavailable(
                    "neither apt-get nor dpkg found in PATH".to_string(),
                ));
            };
            probe.elevate(spec)
        }
        InstallStrategy::Rpm => {
            let spec = if let Some(dnf) = &probe.dnf {
                CommandSpec::new(dnf).args(["install", "-y"]).arg(artifact_path)
            } else if let Some(zypper) = &probe.zypper {
                CommandSpec::new(zypper)
                    .args(["--non-interactive", "install"])
                    .arg(artifact_path)
            } else if let Some(rpm) = &probe.rpm {
                CommandSpec::new(rpm).arg("-i").arg(artifact_path)
            } else {
                return Err(InstillError::MechanismUnavailable(
                    "none of dnf, zypper or rpm found in PATH".to_string(),
                ));
            };
            probe.elevate(spec)
        }
        InstallStrategy::AppImage => {
            // Direct execution is the install mechanism; no package manager
            // and no privilege needed. Without FUSE the AppImage unpacks
            // itself instead of mounting.
            let mut spec = CommandSpec::new(artifact_path);
            if !probe.fuse {
                spec = spec.arg("--appimage-extract-and-run");
            }
            Ok(spec)
        }
    }
}
