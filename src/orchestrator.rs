//! The run pipeline as an explicit state machine. Each state calls exactly
//! one component; any failure transitions straight to `Failed` and skips
//! the remaining states. No partial installs are attempted across
//! strategies: the user retries explicitly with a `--force-*` flag.

use crate::bundle::Bundle;
use crate::config::{InstillConfig, RunConfig};
use crate::detect::{self, OsRelease};
use crate::error::{InstillError, Result};
use crate::executor::{CommandRunner, InstallExecutor};
use crate::launch;
use crate::platform::ToolProbe;
use crate::security;
use crate::session::SessionLog;
use crate::strategy;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Verifying,
    Detecting,
    Selecting,
    Installing,
    Launching,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Verifying => "verifying",
            Stage::Detecting => "detecting",
            Stage::Selecting => "selecting",
            Stage::Installing => "installing",
            Stage::Launching => "launching",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

pub struct Orchestrator<'a> {
    bundle: &'a Bundle,
    run: &'a RunConfig,
    settings: &'a InstillConfig,
    session: &'a SessionLog,
    runner: &'a dyn CommandRunner,
    os_release: OsRelease,
    probe: ToolProbe,
    cancel: Arc<AtomicBool>,
    stage: Stage,
}

impl<'a> Orchestrator<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bundle: &'a Bundle,
        run: &'a RunConfig,
        settings: &'a InstillConfig,
        session: &'a SessionLog,
        runner: &'a dyn CommandRunner,
        os_release: OsRelease,
        probe: ToolProbe,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            bundle,
            run,
            settings,
            session,
            runner,
            os_release,
            probe,
            cancel,
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Drive the pipeline to a terminal state. The session log records the
    /// outcome either way; the caller maps the error to an exit code.
    pub fn run(&mut self) -> Result<()> {
        let result = self.drive();
        match &result {
            Ok(()) => {
                self.stage = Stage::Done;
                self.session.info("stage: done");
            }
            Err(err) => {
                self.stage = Stage::Failed;
                self.session.error(&format!("stage: failed ({err})"));
            }
        }
        result
    }

    fn drive(&mut self) -> Result<()> {
        self.enter(Stage::Verifying)?;
        if self.bundle.is_empty() {
            self.session.warn("bundle contains no artifacts");
        }
        for artifact in self.bundle.artifacts() {
            security::verify_artifact(artifact).inspect_err(|err| {
                self.session
                    .error(&format!("verification failed for {}: {err}", artifact.file_name()));
            })?;
            self.session
                .info(&format!("checksum verified: {}", artifact.file_name()));
        }

        self.enter(Stage::Detecting)?;
        let family = detect::classify(&self.os_release);
        self.session.info(&format!(
            "detected distro family: {family} (id={:?}, id_like={:?})",
            self.os_release.id, self.os_release.id_like
        ));

        self.enter(Stage::Selecting)?;
        let selected = strategy::select(family, self.run, self.bundle)?;
        self.session
            .info(&format!("selected install strategy: {selected}"));

        self.enter(Stage::Installing)?;
        let artifact = self
            .bundle
            .artifact(selected)
            .ok_or(InstillError::NoArtifactAvailable {
                strategy: selected,
                forced: self.run.forced_strategy.is_some(),
            })?;
        let executor = InstallExecutor::new(self.runner, self.session, self.probe.clone());
        let timeout = Duration::from_secs(self.settings.install.timeout_secs);
        executor.execute(artifact, self.run, timeout)?;

        if self.run.launch_after_install {
            self.enter(Stage::Launching)?;
            launch::launch(selected, self.settings, self.run, self.session)?;
        } else {
            self.session.info("launch disabled, skipping");
        }

        Ok(())
    }

    /// Transition into the next state, honoring a pending interrupt so the
    /// session log still records how far the run got.
    fn enter(&mut self, next: Stage) -> Result<()> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(InstillError::Interrupted);
        }
        self.stage = next;
        self.session.info(&format!("stage: {next}"));
        Ok(())
    }
}
