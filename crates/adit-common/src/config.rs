//! Environment-backed configuration for ADIT components
//!
//! Each collaborator gets its own typed config with a `from_env()`
//! constructor. Required keys fail fast with a configuration error;
//! optional keys carry documented defaults.

use crate::error::{AditError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Repository id used when REPOSITORY_ID is not set.
pub const DEFAULT_REPOSITORY_ID: &str = "2";

/// Default per-request timeout for repository calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default total elapsed-time ceiling for transient-failure retries,
/// in seconds (30 minutes).
pub const DEFAULT_RETRY_CEILING_SECS: u64 = 1800;

/// Metadata repository connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Base URL of the repository API
    pub base_url: String,

    /// API username
    pub username: String,

    /// API password
    pub password: String,

    /// Repository id segment used in API paths
    pub repository_id: String,

    /// Optional HTTP basic-auth layered in front of the API
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Total elapsed-time ceiling for transient-failure retries, in seconds
    pub retry_ceiling_secs: u64,
}

impl RepositoryConfig {
    /// Load from environment variables
    ///
    /// Required: `REPOSITORY_API_URL`, `REPOSITORY_USERNAME`,
    /// `REPOSITORY_PASSWORD`. Optional: `REPOSITORY_ID`,
    /// `REPOSITORY_BASIC_AUTH_USERNAME`, `REPOSITORY_BASIC_AUTH_PASSWORD`,
    /// `REPOSITORY_TIMEOUT_SECS`, `REPOSITORY_RETRY_CEILING_SECS`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: require("REPOSITORY_API_URL")?,
            username: require("REPOSITORY_USERNAME")?,
            password: require("REPOSITORY_PASSWORD")?,
            repository_id: env::var("REPOSITORY_ID")
                .unwrap_or_else(|_| DEFAULT_REPOSITORY_ID.to_string()),
            basic_auth_username: env::var("REPOSITORY_BASIC_AUTH_USERNAME").ok(),
            basic_auth_password: env::var("REPOSITORY_BASIC_AUTH_PASSWORD").ok(),
            timeout_secs: parse_or("REPOSITORY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            retry_ceiling_secs: parse_or("REPOSITORY_RETRY_CEILING_SECS", DEFAULT_RETRY_CEILING_SECS),
        })
    }

    /// Build a config pointing at an arbitrary endpoint with default
    /// timings. Intended for tests and local tooling.
    pub fn for_endpoint(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            repository_id: DEFAULT_REPOSITORY_ID.to_string(),
            basic_auth_username: None,
            basic_auth_password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_ceiling_secs: DEFAULT_RETRY_CEILING_SECS,
        }
    }
}

/// Object store (S3-compatible) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,

    /// Key prefix under which published material lives
    /// (`<key_prefix>/<resource_id>/<component_id>/...`)
    pub key_prefix: String,
}

impl StoreConfig {
    /// Load from environment variables
    ///
    /// Recognized: `S3_ENDPOINT`, `S3_REGION`, `S3_BUCKET`,
    /// `S3_ACCESS_KEY`/`AWS_ACCESS_KEY_ID`,
    /// `S3_SECRET_KEY`/`AWS_SECRET_ACCESS_KEY`, `S3_PATH_STYLE`,
    /// `COMMON_KEY_PREFIX`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: require("S3_BUCKET")?,
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .map_err(|_| AditError::config("S3_ACCESS_KEY or AWS_ACCESS_KEY_ID must be set"))?,
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .map_err(|_| {
                    AditError::config("S3_SECRET_KEY or AWS_SECRET_ACCESS_KEY must be set")
                })?,
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            key_prefix: env::var("COMMON_KEY_PREFIX").unwrap_or_default(),
        })
    }

    /// Build a config for a custom endpoint (MinIO, mock server)
    pub fn for_endpoint(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            bucket: bucket.into(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
            key_prefix: key_prefix.into(),
        }
    }
}

/// Staging filesystem settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Absolute parent of the mounted volumes
    pub mount_root: PathBuf,

    /// Relative path of the pre-batch staging area within a volume
    pub source_subdir: String,

    /// Relative path of the batch roots within a volume
    pub batch_subdir: String,

    /// File names removed anywhere under a batch root before processing
    pub files_to_remove: Vec<String>,
}

impl StagingConfig {
    /// Load from environment variables
    ///
    /// Required: `MOUNT_ROOT`. Optional: `SOURCE_SUBDIR` (default
    /// "source"), `BATCH_SUBDIR` (default "batches"), `FILES_TO_REMOVE`
    /// (comma-separated names, default empty).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            mount_root: PathBuf::from(require("MOUNT_ROOT")?),
            source_subdir: env::var("SOURCE_SUBDIR").unwrap_or_else(|_| "source".to_string()),
            batch_subdir: env::var("BATCH_SUBDIR").unwrap_or_else(|_| "batches".to_string()),
            files_to_remove: env::var("FILES_TO_REMOVE")
                .map(|csv| parse_name_list(&csv))
                .unwrap_or_default(),
        })
    }

    /// Pre-batch staging area for a volume
    pub fn source_path(&self, volume: &str) -> PathBuf {
        self.mount_root.join(volume).join(&self.source_subdir)
    }

    /// Batch root for a (volume, batch set, pipeline) triple
    pub fn batch_root(&self, volume: &str, batch_set_id: &str, pipeline: &str) -> PathBuf {
        self.mount_root
            .join(volume)
            .join(&self.batch_subdir)
            .join(format!("{batch_set_id}--{pipeline}"))
    }
}

/// Combined settings for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub repository: RepositoryConfig,
    pub store: StoreConfig,
    pub staging: StagingConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            repository: RepositoryConfig::from_env()?,
            store: StoreConfig::from_env()?,
            staging: StagingConfig::from_env()?,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AditError::config(format!("{key} must be set")))
}

fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_name_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_staging_paths() {
        let config = StagingConfig {
            mount_root: PathBuf::from("/mnt"),
            source_subdir: "source".to_string(),
            batch_subdir: "batches".to_string(),
            files_to_remove: vec![],
        };

        assert_eq!(config.source_path("vol1"), PathBuf::from("/mnt/vol1/source"));
        assert_eq!(
            config.batch_root("vol1", "2024-01", "ingest"),
            PathBuf::from("/mnt/vol1/batches/2024-01--ingest")
        );
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(
            parse_name_list("Thumbs.db, .DS_Store,,desktop.ini"),
            vec!["Thumbs.db", ".DS_Store", "desktop.ini"]
        );
        assert!(parse_name_list("").is_empty());
    }

    #[test]
    #[serial]
    fn test_repository_config_from_env() {
        env::set_var("REPOSITORY_API_URL", "http://localhost:4567");
        env::set_var("REPOSITORY_USERNAME", "admin");
        env::set_var("REPOSITORY_PASSWORD", "admin");
        env::remove_var("REPOSITORY_ID");

        let config = RepositoryConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:4567");
        assert_eq!(config.repository_id, DEFAULT_REPOSITORY_ID);
        assert_eq!(config.retry_ceiling_secs, DEFAULT_RETRY_CEILING_SECS);

        env::remove_var("REPOSITORY_API_URL");
        env::remove_var("REPOSITORY_USERNAME");
        env::remove_var("REPOSITORY_PASSWORD");
    }

    #[test]
    #[serial]
    fn test_repository_config_requires_url() {
        env::remove_var("REPOSITORY_API_URL");
        assert!(matches!(
            RepositoryConfig::from_env(),
            Err(AditError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_staging_config_from_env() {
        env::set_var("MOUNT_ROOT", "/mnt/archives");
        env::set_var("FILES_TO_REMOVE", "Thumbs.db,.DS_Store");
        env::remove_var("SOURCE_SUBDIR");
        env::remove_var("BATCH_SUBDIR");

        let config = StagingConfig::from_env().unwrap();
        assert_eq!(config.mount_root, PathBuf::from("/mnt/archives"));
        assert_eq!(config.source_subdir, "source");
        assert_eq!(config.batch_subdir, "batches");
        assert_eq!(config.files_to_remove, vec!["Thumbs.db", ".DS_Store"]);

        env::remove_var("MOUNT_ROOT");
        env::remove_var("FILES_TO_REMOVE");
    }

    #[test]
    fn test_store_config_for_endpoint() {
        let config = StoreConfig::for_endpoint("http://localhost:9000", "published", "collections");
        assert_eq!(config.endpoint, Some("http://localhost:9000".to_string()));
        assert_eq!(config.bucket, "published");
        assert_eq!(config.key_prefix, "collections");
        assert!(config.path_style);
    }
}
