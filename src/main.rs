use clap::Parser;
use colored::Colorize;
use instill::bundle::{Bundle, LOGS_DIR};
use instill::config::{InstillConfig, RunConfig};
use instill::detect::OsRelease;
use instill::error::{InstillError, Result, format_error_chain, get_exit_code};
use instill::executor::SystemRunner;
use instill::orchestrator::Orchestrator;
use instill::platform::ToolProbe;
use instill::session::SessionLog;
use instill::{check, logging};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Parser)]
#[command(name = "instill")]
#[command(
    author,
    version,
    about = "Smart Linux installer: detects the distro, picks a package format, installs it",
    long_about = None
)]
struct Cli {
    /// Report the intended actions without executing them
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v info, -vv debug); streams installer output live
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Force installation from the bundled .deb package
    #[arg(long)]
    force_deb: bool,

    /// Force installation from the bundled .rpm package
    #[arg(long)]
    force_rpm: bool,

    /// Force installation from the bundled AppImage
    #[arg(long)]
    force_appimage: bool,

    /// Do not launch the application after a successful install
    #[arg(long)]
    no_launch: bool,

    /// Launch the terminal interface instead of the GUI
    #[arg(long)]
    tui: bool,

    /// Inspect the bundle and host without installing anything
    #[arg(long)]
    check: bool,

    /// Bundle directory (defaults to the directory of this executable)
    #[arg(long, value_name = "DIR")]
    bundle_dir: Option<PathBuf>,

    /// Install timeout in seconds (overrides instill.toml)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    if let Err(e) = try_run(&cli) {
        eprintln!("{}", format_error_chain(&e));
        std::process::exit(get_exit_code(&e));
    }

    if !cli.check {
        let summary = if cli.dry_run {
            "dry run complete, no changes were made"
        } else {
            "installation complete"
        };
        println!("{}", summary.green().bold());
    }
}

fn try_run(cli: &Cli) -> Result<()> {
    let bundle_root = resolve_bundle_root(cli)?;

    if cli.check {
        return check::run_check(&bundle_root);
    }

    // Flag conflicts are reported before any pipeline stage runs
    let run_config = RunConfig::from_flags(
        cli.dry_run,
        cli.verbose > 0,
        cli.force_deb,
        cli.force_rpm,
        cli.force_appimage,
        cli.no_launch,
        cli.tui,
    )?;

    let mut settings = InstillConfig::load(&bundle_root)?;
    if let Some(timeout) = cli.timeout {
        settings.install.timeout_secs = timeout;
    }

    let session = SessionLog::open(&bundle_root.join(LOGS_DIR))?;
    session.info(&format!(
        "instill {} starting (bundle: {})",
        env!("CARGO_PKG_VERSION"),
        bundle_root.display()
    ));

    let cancel = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&cancel))
            .map_err(|e| InstillError::SystemError(format!("failed to register signal handler: {e}")))?;
    }

    let bundle = Bundle::load(&bundle_root).inspect_err(|e| {
        session.error(&format!("aborted before pipeline start: {e}"));
    })?;

    let runner = SystemRunner::new(Arc::clone(&cancel), settings.install.tail_lines);
    let mut orchestrator = Orchestrator::new(
        &bundle,
        &run_config,
        &settings,
        &session,
        &runner,
        OsRelease::load(),
        ToolProbe::detect(),
        cancel,
    );

    let result = orchestrator.run();
    session.close();
    result
}

fn resolve_bundle_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.bundle_dir {
        return Ok(dir.clone());
    }
    let exe = std::env::current_exe()
        .map_err(|e| InstillError::SystemError(format!("cannot locate own executable: {e}")))?;
    exe.parent().map(PathBuf::from).ok_or_else(|| {
        InstillError::SystemError("executable has no parent directory".to_string())
    })
}
