//! `adit validate` - pre-flight a volume's source tree
//!
//! Prints the full inspection report as JSON, then exits nonzero if
//! any violation was collected.

use adit_common::{RepositoryConfig, Result, StagingConfig};
use adit_core::client::RepositoryClient;
use adit_core::inspect::{validate_staging_tree, DefaultPolicy};

pub async fn run(volume: &str) -> Result<()> {
    let repo = RepositoryClient::connect(&RepositoryConfig::from_env()?).await?;
    let staging = StagingConfig::from_env()?;

    let report = validate_staging_tree(&repo, &staging, volume, &DefaultPolicy).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    report.ensure_valid()
}
