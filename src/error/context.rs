use crate::error::InstillError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a InstillError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a InstillError) -> Self {
        let (suggestion, details) = match error {
            InstillError::ChecksumMismatch {
                expected, actual, ..
            } => {
                let suggestion = Some(
                    "The bundle may be corrupted or incomplete. Re-download the bundle and try \
                     again."
                        .to_string(),
                );
                let details = Some(format!("Expected: {expected}\nActual:   {actual}"));
                (suggestion, details)
            }
            InstillError::MissingChecksum(name) => {
                let suggestion = Some(
                    "Every artifact must ship a digest entry under checksums/. Re-download the \
                     bundle; if the problem persists the bundle was packaged incorrectly."
                        .to_string(),
                );
                let details = Some(format!("No checksums/{name}.sha256 entry was found."));
                (suggestion, details)
            }
            InstillError::NoArtifactAvailable { strategy, forced } => {
                let suggestion = if *forced {
                    Some(format!(
                        "The bundle does not ship a {strategy} package. Re-run without \
                         --force-{} to let instill pick an available format.",
                        strategy.flag_name()
                    ))
                } else {
                    Some(
                        "The bundle ships no package format usable on this system, not even an \
                         AppImage. Obtain a complete bundle."
                            .to_string(),
                    )
                };
                (suggestion, None)
            }
            InstillError::InstallFailure {
                exit_code,
                output_tail,
            } => {
                let suggestion = Some(
                    "Check the session log under logs/ for the full installer output. You can \
                     retry with a different format via --force-appimage."
                        .to_string(),
                );
                let mut details = match exit_code {
                    Some(code) => format!("Installer exited with code {code}."),
                    None => "Installer was terminated by a signal.".to_string(),
                };
                if !output_tail.is_empty() {
                    details.push_str("\nLast output:\n");
                    details.push_str(&output_tail.join("\n"));
                }
                (suggestion, Some(details))
            }
            InstillError::Timeout { seconds } => {
                let suggestion = Some(
                    "The install mechanism may be waiting on network-fetched dependencies. \
                     Re-run with a larger --timeout, or check your network connection."
                        .to_string(),
                );
                let details = Some(format!(
                    "The installer subprocess was killed after {seconds} seconds."
                ));
                (suggestion, details)
            }
            InstillError::ConfigurationError(msg) => {
                let suggestion =
                    Some("Run with --help to see how the flags combine.".to_string());
                let details = Some(msg.clone());
                (suggestion, details)
            }
            InstillError::ConfigFile(msg) => {
                let suggestion = Some(
                    "Fix or remove instill.toml at the bundle root; all of its settings are \
                     optional."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            InstillError::InvalidBundle(msg) => {
                let suggestion = Some(
                    "A bundle directory must contain artifacts/ and checksums/. Point \
                     --bundle-dir at the unpacked bundle root."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            InstillError::MechanismUnavailable(msg) => {
                let suggestion = Some(
                    "Install the distribution's package manager, or re-run with \
                     --force-appimage which needs no package manager."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            InstillError::PermissionDenied(_) => {
                let suggestion = Some(
                    "Package installation needs elevated privileges. Re-run as root or install \
                     sudo."
                        .to_string(),
                );
                (suggestion, None)
            }
            InstillError::LaunchFailed(msg) => {
                let suggestion = Some(
                    "The application installed successfully but could not be started. Launch it \
                     manually, or fix the [launch] entries in instill.toml."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            InstillError::Interrupted => {
                let suggestion = Some(
                    "The run was cancelled. The session log under logs/ records how far it got."
                        .to_string(),
                );
                (suggestion, None)
            }
            InstillError::Io(err) => {
                let suggestion = match err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions on the bundle directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the bundle directory is complete.".to_string())
                    }
                    _ => None,
                };
                (suggestion, None)
            }
            InstillError::SystemError(_) => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
