mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::format_error_chain;

use crate::bundle::InstallStrategy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstillError {
    #[error("checksum mismatch for '{artifact}'")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("no checksum recorded for '{0}'")]
    MissingChecksum(String),

    #[error("no {strategy} artifact available in bundle")]
    NoArtifactAvailable {
        strategy: InstallStrategy,
        forced: bool,
    },

    #[error("install mechanism failed")]
    InstallFailure {
        exit_code: Option<i32>,
        output_tail: Vec<String>,
    },

    #[error("install mechanism timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("configuration file error: {0}")]
    ConfigFile(String),

    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("install mechanism unavailable: {0}")]
    MechanismUnavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("failed to launch application: {0}")]
    LaunchFailed(String),

    #[error("interrupted")]
    Interrupted,

    #[error("system error: {0}")]
    SystemError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InstillError>;
