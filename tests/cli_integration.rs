mod common;

use assert_cmd::Command;
use common::TestBundle;
use predicates::prelude::*;
use std::fs;

fn instill() -> Command {
    Command::cargo_bin("instill").unwrap()
}

#[test]
fn conflicting_force_flags_are_a_configuration_error() {
    let test_bundle = TestBundle::new();
    test_bundle.add_artifact("app-1.0.AppImage", b"payload");

    instill()
        .args([
            "--force-deb",
            "--force-rpm",
            "--bundle-dir",
            test_bundle.root().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("at most one --force-"));

    // Reported before any pipeline stage runs: no session log was written
    assert!(test_bundle.log_files().is_empty());
}

#[test]
fn dry_run_on_appimage_bundle_succeeds() {
    let test_bundle = TestBundle::new();
    test_bundle.add_artifact("app-1.0.AppImage", b"payload");

    instill()
        .args([
            "--dry-run",
            "--no-launch",
            "--bundle-dir",
            test_bundle.root().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry-run: would execute"))
        .stdout(predicate::str::contains("dry run complete"));

    let logs = test_bundle.log_files();
    assert_eq!(logs.len(), 1);
    let log = fs::read_to_string(&logs[0]).unwrap();
    assert!(log.contains("stage: done"));
}

#[test]
fn dry_run_with_forced_appimage_reports_the_exact_command() {
    let test_bundle = TestBundle::new();
    let path = test_bundle.add_artifact("app-1.0.AppImage", b"payload");

    instill()
        .args([
            "--dry-run",
            "--no-launch",
            "--force-appimage",
            "--bundle-dir",
            test_bundle.root().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.to_str().unwrap()));
}

#[test]
fn empty_bundle_dir_is_invalid() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    instill()
        .args(["--dry-run", "--bundle-dir", temp_dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid bundle"));
}

#[test]
fn forced_strategy_without_artifact_exits_with_no_artifact_code() {
    let test_bundle = TestBundle::new();
    test_bundle.add_artifact("app-1.0.AppImage", b"payload");

    instill()
        .args([
            "--dry-run",
            "--force-rpm",
            "--bundle-dir",
            test_bundle.root().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("no rpm artifact available"));
}

#[test]
fn tampered_artifact_exits_with_checksum_code() {
    let test_bundle = TestBundle::new();
    let path = test_bundle.add_artifact("app-1.0.AppImage", b"recorded");
    fs::write(path, b"tampered").unwrap();

    instill()
        .args([
            "--dry-run",
            "--bundle-dir",
            test_bundle.root().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("checksum mismatch"));
}

#[test]
fn check_reports_bundle_without_installing() {
    let test_bundle = TestBundle::new();
    test_bundle.add_artifact("app-1.0.AppImage", b"payload");

    instill()
        .args(["--check", "--bundle-dir", test_bundle.root().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategy"))
        .stdout(predicate::str::contains("Detected distro family"));

    // Read-only: --check writes no session log
    assert!(test_bundle.log_files().is_empty());
}
