use crate::error::InstillError;

/// Stable exit code mapping, documented in the README. Scripts depend on
/// these values; add new variants at the end, never renumber.
pub fn get_exit_code(error: &InstillError) -> i32 {
    match error {
        InstillError::ConfigurationError(_)
        | InstillError::ConfigFile(_)
        | InstillError::InvalidBundle(_) => 2,

        InstillError::ChecksumMismatch { .. } | InstillError::MissingChecksum(_) => 3,

        InstillError::NoArtifactAvailable { .. } => 4,

        InstillError::InstallFailure { .. } | InstillError::MechanismUnavailable(_) => 5,

        InstillError::Timeout { .. } => 6,

        InstillError::LaunchFailed(_) => 7,

        InstillError::PermissionDenied(_) => 13,

        InstillError::Interrupted => 130, // 128 + SIGINT

        InstillError::SystemError(_) | InstillError::Io(_) => 1,
    }
}
