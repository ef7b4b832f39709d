//! Strategy selection: map the detected family (or an explicit override)
//! to an install strategy against what the bundle actually ships.

use crate::bundle::{Bundle, InstallStrategy};
use crate::config::RunConfig;
use crate::detect::DistroFamily;
use crate::error::{InstillError, Result};

/// Selection policy, in order:
///
/// 1. A forced strategy wins verbatim. It never falls back: silently
///    substituting a user's explicit choice would violate the override
///    contract, so a missing artifact is a hard failure.
/// 2. Otherwise the family maps to its default format.
/// 3. A missing default artifact falls back to AppImage, the one format
///    that needs no package manager. If that is missing too, there is
///    nothing to install.
pub fn select(
    family: DistroFamily,
    run: &RunConfig,
    bundle: &Bundle,
) -> Result<InstallStrategy> {
    if let Some(forced) = run.forced_strategy {
        if bundle.artifact(forced).is_some() {
            log::info!("using forced strategy {forced}");
            return Ok(forced);
        }
        return Err(InstillError::NoArtifactAvailable {
            strategy: forced,
            forced: true,
        });
    }

    let preferred = default_strategy(family);
    if bundle.artifact(preferred).is_some() {
        return Ok(preferred);
    }

    if preferred != InstallStrategy::AppImage
        && bundle.artifact(InstallStrategy::AppImage).is_some()
    {
        log::info!("bundle ships no {preferred} artifact, falling back to AppImage");
        return Ok(InstallStrategy::AppImage);
    }

    Err(InstillError::NoArtifactAvailable {
        strategy: preferred,
        forced: false,
    })
}

pub fn default_strategy(family: DistroFamily) -> InstallStrategy {
    match family {
        DistroFamily::Debian => InstallStrategy::Deb,
        DistroFamily::RedHat => InstallStrategy::Rpm,
        DistroFamily::Unknown => InstallStrategy::AppImage,
    }
}
