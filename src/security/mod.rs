use crate::bundle::Artifact;
use crate::error::{InstillError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Verify an artifact against its recorded SHA-256 digest. Fails closed:
/// a missing digest entry, an unreadable file, or a mismatch is a hard
/// failure, never silently skipped. Hex comparison is case-insensitive.
pub fn verify_artifact(artifact: &Artifact) -> Result<()> {
    let name = artifact.file_name();
    let expected = artifact
        .expected_checksum
        .as_deref()
        .ok_or_else(|| InstillError::MissingChecksum(name.clone()))?;

    let actual = calculate_sha256(&artifact.path)?;

    if !actual.eq_ignore_ascii_case(expected) {
        return Err(InstillError::ChecksumMismatch {
            artifact: name,
            expected: expected.to_string(),
            actual,
        });
    }

    log::debug!("checksum verified for {name}");
    Ok(())
}

pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut buffer = vec![0; CHUNK_SIZE];
    let mut hasher = Sha256::new();

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
