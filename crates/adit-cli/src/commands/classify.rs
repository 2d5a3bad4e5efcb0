//! `adit classify` - resolve an identifier's eligibility

use adit_common::{RepositoryConfig, Result, StoreConfig};
use adit_core::client::RepositoryClient;
use adit_core::eligibility::{classify, WorkflowTarget};
use adit_core::store::ObjectStore;

pub async fn run(identifier: &str, target: &str) -> Result<()> {
    let target: WorkflowTarget = target.parse()?;

    let repo = RepositoryClient::connect(&RepositoryConfig::from_env()?).await?;
    let store = ObjectStore::new(&StoreConfig::from_env()?);

    let report = classify(&repo, &store, identifier, target).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
