use crate::bundle::InstallStrategy;
use crate::error::{InstillError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE_NAME: &str = "instill.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_TAIL_LINES: usize = 20;

/// Optional bundle-level settings, read from `instill.toml` at the bundle
/// root. Every field has a default; a missing file means defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstillConfig {
    #[serde(default)]
    pub install: InstallSettings,

    #[serde(default)]
    pub launch: LaunchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallSettings {
    /// Hard cap on the install subprocess; on expiry it is killed and the
    /// run fails with a timeout error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many trailing output lines are surfaced when a captured install
    /// fails.
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_tail_lines() -> usize {
    DEFAULT_TAIL_LINES
}

/// Program names launched after a successful install. Both are optional;
/// an unset entry skips the launch step with a session-log note.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LaunchSettings {
    pub gui: Option<String>,
    pub tui: Option<String>,
}

impl InstillConfig {
    pub fn load(bundle_root: &Path) -> Result<Self> {
        let config_path = bundle_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            log::debug!("config file not found at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: InstillConfig = toml::from_str(&contents).map_err(|e| {
            InstillError::ConfigFile(format!("failed to parse {CONFIG_FILE_NAME}: {e}"))
        })?;

        log::debug!("loaded config from {:?}", config_path);
        Ok(config)
    }
}

/// The resolved options for one invocation, built once from CLI flags and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dry_run: bool,
    pub verbose: bool,
    pub forced_strategy: Option<InstallStrategy>,
    pub launch_after_install: bool,
    pub use_tui: bool,
}

impl RunConfig {
    /// Validates flag combinations before any pipeline stage runs. At most
    /// one `--force-*` flag may be supplied.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn from_flags(
        dry_run: bool,
        verbose: bool,
        force_deb: bool,
        force_rpm: bool,
        force_appimage: bool,
        no_launch: bool,
        use_tui: bool,
    ) -> Result<Self> {
        let forced: Vec<InstallStrategy> = [
            (force_deb, InstallStrategy::Deb),
            (force_rpm, InstallStrategy::Rpm),
            (force_appimage, InstallStrategy::AppImage),
        ]
        .into_iter()
        .filter_map(|(flag, strategy)| flag.then_some(strategy))
        .collect();

        if forced.len() > 1 {
            let flags: Vec<String> = forced
                .iter()
                .map(|s| format!("--force-{}", s.flag_name()))
                .collect();
            return Err(InstillError::ConfigurationError(format!(
                "at most one --force-* flag may be supplied, got {}",
                flags.join(" and ")
            )));
        }

        Ok(Self {
            dry_run,
            verbose,
            forced_strategy: forced.into_iter().next(),
            launch_after_install: !no_launch,
            use_tui,
        })
    }
}
