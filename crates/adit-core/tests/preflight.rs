//! Pre-flight validation over a source tree, against a mock repository

mod common;

use adit_common::{AditError, StagingConfig};
use adit_core::inspect::{validate_staging_tree, DefaultPolicy, ExtensionPolicy};
use common::{connect, mount_login, mount_missing, mount_record};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

fn staging_config(mount: &Path, removals: &[&str]) -> StagingConfig {
    StagingConfig {
        mount_root: mount.to_path_buf(),
        source_subdir: "source".to_string(),
        batch_subdir: "batches".to_string(),
        files_to_remove: removals.iter().map(|name| name.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_clean_tree_passes() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_record(&server, "item-1", 1).await;
    mount_record(&server, "item-2", 2).await;

    let mount = TempDir::new().unwrap();
    let source = mount.path().join("vol1/source");
    fs::create_dir_all(source.join("item-2")).unwrap();
    fs::write(source.join("item-1.tif"), b"data").unwrap();
    fs::write(source.join("item-2/page-1.tif"), b"data").unwrap();

    let config = staging_config(mount.path(), &[]);
    let client = connect(&server).await;
    let report = validate_staging_tree(&client, &config, "vol1", &DefaultPolicy)
        .await
        .unwrap();

    assert_eq!(report.file_count, 2);
    assert_eq!(report.eligible.len(), 2);
    assert!(report.ineligible.is_empty());
    assert!(report.ensure_valid().is_ok());
}

#[tokio::test]
async fn test_all_violations_collected_before_reporting() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_record(&server, "item-1", 1).await;
    mount_missing(&server, "item-2").await;
    mount_record(&server, "item-3", 3).await;
    mount_record(&server, "item-4", 4).await;

    let mount = TempDir::new().unwrap();
    let source = mount.path().join("vol1/source");
    // item-2: unknown record; item-3: nested subdirectory; item-4: empty
    fs::create_dir_all(source.join("item-3/nested")).unwrap();
    fs::create_dir_all(source.join("item-4")).unwrap();
    fs::write(source.join("item-1.tif"), b"data").unwrap();
    fs::write(source.join("item-2.tif"), b"data").unwrap();
    fs::write(source.join("item-3/page-1.tif"), b"data").unwrap();

    let config = staging_config(mount.path(), &[]);
    let client = connect(&server).await;
    let report = validate_staging_tree(&client, &config, "vol1", &DefaultPolicy)
        .await
        .unwrap();

    // inspection never stops at the first problem
    assert_eq!(report.ineligible, vec!["item-2"]);
    assert_eq!(report.nested_directories.len(), 1);
    assert_eq!(report.empty_directories.len(), 1);
    assert_eq!(report.file_count, 3);

    let message = report.ensure_valid().unwrap_err().to_string();
    assert!(message.contains("item-2"));
    assert!(message.contains("item-3"));
    assert!(message.contains("item-4"));
    assert!(matches!(report.ensure_valid(), Err(AditError::Validation(_))));
}

#[tokio::test]
async fn test_policy_flags_unsupported_files() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_record(&server, "item-1", 1).await;

    let mount = TempDir::new().unwrap();
    let source = mount.path().join("vol1/source");
    fs::create_dir_all(source.join("item-1")).unwrap();
    fs::write(source.join("item-1/page-1.tif"), b"data").unwrap();
    fs::write(source.join("item-1/notes.docx"), b"data").unwrap();

    let config = staging_config(mount.path(), &[]);
    let client = connect(&server).await;
    let policy = ExtensionPolicy::new(["tif"]);
    let report = validate_staging_tree(&client, &config, "vol1", &policy)
        .await
        .unwrap();

    assert_eq!(report.unsupported_files.len(), 1);
    assert!(report.unsupported_files[0].ends_with("notes.docx"));
    assert!(report.ensure_valid().is_err());
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let mount = TempDir::new().unwrap();
    let config = staging_config(mount.path(), &[]);
    let client = connect(&server).await;

    let err = validate_staging_tree(&client, &config, "vol1", &DefaultPolicy)
        .await
        .unwrap_err();
    assert!(matches!(err, AditError::SourceMissing(_)));
}

#[tokio::test]
async fn test_removal_list_swept_before_inspection() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_record(&server, "item-1", 1).await;

    let mount = TempDir::new().unwrap();
    let source = mount.path().join("vol1/source");
    // without the sweep, Thumbs.db would be counted and classified
    fs::create_dir_all(source.join("item-1")).unwrap();
    fs::write(source.join("item-1/page-1.tif"), b"data").unwrap();
    fs::write(source.join("item-1/Thumbs.db"), b"junk").unwrap();

    let config = staging_config(mount.path(), &["Thumbs.db"]);
    let client = connect(&server).await;
    let report = validate_staging_tree(&client, &config, "vol1", &DefaultPolicy)
        .await
        .unwrap();

    assert_eq!(report.file_count, 1);
    assert!(!source.join("item-1/Thumbs.db").exists());
    assert!(report.ensure_valid().is_ok());
}
