//! CLI end-to-end smoke tests
//!
//! Network-free coverage: help output, configuration failures, and the
//! filesystem-only init-batch path.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("adit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init-batch"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn test_no_subcommand_shows_help() {
    Command::cargo_bin("adit")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_init_batch_requires_configuration() {
    Command::cargo_bin("adit")
        .unwrap()
        .args(["init-batch", "vol1", "2024-01", "ingest"])
        .env_remove("MOUNT_ROOT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MOUNT_ROOT"));
}

#[test]
fn test_init_batch_moves_source_into_stage_1() {
    let mount = TempDir::new().unwrap();
    fs::create_dir_all(mount.path().join("vol1/source")).unwrap();
    fs::write(mount.path().join("vol1/source/a.tif"), b"data").unwrap();

    Command::cargo_bin("adit")
        .unwrap()
        .args(["init-batch", "vol1", "2024-01", "ingest"])
        .env("MOUNT_ROOT", mount.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01--ingest"));

    assert!(mount
        .path()
        .join("vol1/batches/2024-01--ingest/STAGE_1_INITIAL/a.tif")
        .is_file());
    assert!(mount.path().join("vol1/source").is_dir());
}

#[test]
fn test_classify_rejects_unknown_target() {
    Command::cargo_bin("adit")
        .unwrap()
        .args(["classify", "RC0123", "--target", "reports"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workflow target"));
}
