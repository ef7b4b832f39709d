//! `--check`: read-only preflight report over the bundle and the host.

use crate::bundle::{Bundle, InstallStrategy};
use crate::config::RunConfig;
use crate::detect::{self, OsRelease};
use crate::error::{InstillError, Result};
use crate::platform::ToolProbe;
use crate::security;
use crate::strategy;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use std::path::Path;

pub fn run_check(bundle_root: &Path) -> Result<()> {
    let bundle = Bundle::load(bundle_root)?;
    let probe = ToolProbe::detect();
    let os_release = OsRelease::load();
    let family = detect::classify(&os_release);

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
    table.set_header(vec![
        Cell::new("Strategy"),
        Cell::new("Artifact"),
        Cell::new("Checksum"),
        Cell::new("Mechanism"),
    ]);

    for strategy in InstallStrategy::ALL {
        let (artifact_cell, checksum_cell) = match bundle.artifact(strategy) {
            Some(artifact) => (
                Cell::new(artifact.file_name()),
                checksum_cell(artifact),
            ),
            None => (Cell::new("-"), Cell::new("-")),
        };
        table.add_row(vec![
            Cell::new(strategy.to_string()),
            artifact_cell,
            checksum_cell,
            mechanism_cell(strategy, &probe),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "Detected distro family: {} (id={}, id_like=[{}])",
        family.to_string().bold(),
        os_release.id.as_deref().unwrap_or("-"),
        os_release.id_like.join(" ")
    );

    let unforced = RunConfig {
        dry_run: true,
        verbose: false,
        forced_strategy: None,
        launch_after_install: false,
        use_tui: false,
    };
    match strategy::select(family, &unforced, &bundle) {
        Ok(selected) => {
            println!(
                "An unforced run would install via: {}",
                selected.to_string().green().bold()
            );
        }
        Err(err) => {
            println!(
                "{} an unforced run would fail: {err}",
                "warning:".yellow().bold()
            );
        }
    }

    Ok(())
}

fn checksum_cell(artifact: &crate::bundle::Artifact) -> Cell {
    match security::verify_artifact(artifact) {
        Ok(()) => Cell::new("ok").fg(Color::Green),
        Err(InstillError::ChecksumMismatch { .. }) => Cell::new("mismatch").fg(Color::Red),
        Err(InstillError::MissingChecksum(_)) => Cell::new("missing").fg(Color::Red),
        Err(_) => Cell::new("unreadable").fg(Color::Red),
    }
}

fn mechanism_cell(strategy: InstallStrategy, probe: &ToolProbe) -> Cell {
    let elevation = if probe.root {
        ""
    } else if probe.sudo.is_some() {
        " via sudo"
    } else {
        " (needs root)"
    };
    match strategy {
        InstallStrategy::Deb => {
            if probe.apt_get.is_some() {
                Cell::new(format!("apt-get{elevation}"))
            } else if probe.dpkg.is_some() {
                Cell::new(format!("dpkg{elevation}"))
            } else {
                Cell::new("unavailable").fg(Color::Red)
            }
        }
        InstallStrategy::Rpm => {
            if probe.dnf.is_some() {
                Cell::new(format!("dnf{elevation}"))
            } else if probe.zypper.is_some() {
                Cell::new(format!("zypper{elevation}"))
            } else if probe.rpm.is_some() {
                Cell::new(format!("rpm{elevation}"))
            } else {
                Cell::new("unavailable").fg(Color::Red)
            }
        }
        InstallStrategy::AppImage => {
            if probe.fuse {
                Cell::new("direct execution")
            } else {
                Cell::new("direct execution (extract-and-run)")
            }
        }
    }
}
