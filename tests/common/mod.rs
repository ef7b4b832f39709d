use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bundle directory laid out the way the packaging step produces it:
/// `artifacts/` with one file per format and `checksums/` with one digest
/// entry per artifact.
pub struct TestBundle {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestBundle {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        fs::create_dir_all(root.join("artifacts")).unwrap();
        fs::create_dir_all(root.join("checksums")).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add an artifact with a correct sha256sum-format digest entry.
    pub fn add_artifact(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.write_artifact_file(name, contents);
        let digest = hex::encode(Sha256::digest(contents));
        fs::write(
            self.root.join("checksums").join(format!("{name}.sha256")),
            format!("{digest}  {name}\n"),
        )
        .unwrap();
        path
    }

    /// Add an artifact with no digest entry at all.
    pub fn add_artifact_without_checksum(&self, name: &str, contents: &[u8]) -> PathBuf {
        self.write_artifact_file(name, contents)
    }

    /// Add an artifact whose recorded digest is wrong.
    pub fn add_artifact_with_bad_checksum(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.write_artifact_file(name, contents);
        fs::write(
            self.root.join("checksums").join(format!("{name}.sha256")),
            format!("{}  {name}\n", "0".repeat(64)),
        )
        .unwrap();
        path
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.root.join("instill.toml"), contents).unwrap();
    }

    pub fn log_files(&self) -> Vec<PathBuf> {
        let logs_dir = self.root.join("logs");
        if !logs_dir.is_dir() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = fs::read_dir(logs_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }

    fn write_artifact_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.join("artifacts").join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}
