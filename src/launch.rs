//! Post-install launch of the installed application's GUI or TUI.

use crate::bundle::InstallStrategy;
use crate::config::{InstillConfig, RunConfig};
use crate::error::{InstillError, Result};
use crate::session::SessionLog;
use std::process::{Command, Stdio};

/// Start the installed application. The launcher program names come from
/// `instill.toml`; an unset entry skips the step with a note rather than
/// failing a successful install. Only failure to start is an error: once
/// the application runs, its exit status is its own business.
pub fn launch(
    strategy: InstallStrategy,
    settings: &InstillConfig,
    run: &RunConfig,
    session: &SessionLog,
) -> Result<()> {
    if strategy == InstallStrategy::AppImage {
        // Direct execution already ran the application
        session.info("AppImage strategy launches during installation, nothing to do");
        return Ok(());
    }

    let configured = if run.use_tui {
        settings.launch.tui.as_deref()
    } else {
        settings.launch.gui.as_deref()
    };
    let Some(program) = configured else {
        let kind = if run.use_tui { "tui" } else { "gui" };
        session.warn(&format!(
            "no [launch] {kind} entry configured, skipping launch"
        ));
        return Ok(());
    };

    if run.dry_run {
        session.info(&format!("dry-run: would launch {program}"));
        return Ok(());
    }

    let resolved = which::which(program).map_err(|e| {
        InstillError::LaunchFailed(format!("launcher '{program}' not found: {e}"))
    })?;

    if run.use_tui {
        // A TUI owns the terminal; hand it over and wait
        session.info(&format!("launching TUI {}", resolved.display()));
        let status = Command::new(&resolved)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                InstillError::LaunchFailed(format!("failed to start {program}: {e}"))
            })?;
        if !status.success() {
            session.warn(&format!("TUI exited with status {status}"));
        }
    } else {
        // The GUI detaches; the installer's job ends once it is running
        session.info(&format!("launching {}", resolved.display()));
        Command::new(&resolved)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                InstillError::LaunchFailed(format!("failed to start {program}: {e}"))
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InstillConfig, LaunchSettings};
    use tempfile::TempDir;

    fn run_config(use_tui: bool, dry_run: bool) -> RunConfig {
        RunConfig {
            dry_run,
            verbose: false,
            forced_strategy: None,
            launch_after_install: true,
            use_tui,
        }
    }

    fn session() -> (TempDir, SessionLog) {
        let temp_dir = TempDir::new().unwrap();
        let session = SessionLog::open(temp_dir.path()).unwrap();
        (temp_dir, session)
    }

    #[test]
    fn test_launch_appimage_is_noop() {
        let (_dir, session) = session();
        let settings = InstillConfig::default();
        launch(
            InstallStrategy::AppImage,
            &settings,
            &run_config(false, false),
            &session,
        )
        .unwrap();
    }

    #[test]
    fn test_launch_without_configuration_skips() {
        let (_dir, session) = session();
        let settings = InstillConfig::default();
        launch(
            InstallStrategy::Deb,
            &settings,
            &run_config(false, false),
            &session,
        )
        .unwrap();
    }

    #[test]
    fn test_launch_dry_run_does_not_resolve_launcher() {
        let (_dir, session) = session();
        let settings = InstillConfig {
            launch: LaunchSettings {
                gui: Some("definitely-not-a-real-program".to_string()),
                tui: None,
            },
            ..Default::default()
        };
        // Dry-run must succeed even though the launcher does not exist
        launch(
            InstallStrategy::Deb,
            &settings,
            &run_config(false, true),
            &session,
        )
        .unwrap();
    }

    #[test]
    fn test_launch_missing_launcher_fails() {
        let (_dir, session) = session();
        let settings = InstillConfig {
            launch: LaunchSettings {
                gui: Some("definitely-not-a-real-program".to_string()),
                tui: None,
            },
            ..Default::default()
        };
        let err = launch(
            InstallStrategy::Deb,
            &settings,
            &run_config(false, false),
            &session,
        )
        .unwrap_err();
        assert!(matches!(err, InstillError::LaunchFailed(_)));
    }
}
