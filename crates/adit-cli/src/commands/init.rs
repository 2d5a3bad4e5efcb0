//! `adit init-batch` - claim a volume's source directory as a new batch

use adit_common::{Result, StagingConfig};
use adit_core::staging::Batch;
use tracing::info;

pub async fn run(volume: &str, batch_set_id: &str, pipeline: &str) -> Result<()> {
    let config = StagingConfig::from_env()?;
    let batch = Batch::initialize(&config, volume, batch_set_id, pipeline)?;

    info!(root = %batch.root().display(), "batch initialized");
    println!("{}", batch.root().display());
    Ok(())
}
