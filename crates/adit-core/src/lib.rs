//! ADIT Core Library
//!
//! Staging, eligibility, and reconciliation logic for archival digital
//! file ingestion.
//!
//! # Components
//!
//! - [`client::RepositoryClient`]: authenticated session with the
//!   metadata repository, with transient-failure retry
//! - [`store::ObjectStore`]: S3-compatible object store access
//! - [`eligibility`]: resource-vs-item identifier classification
//! - [`inspect`]: directory inspection and pre-flight validation
//! - [`staging`]: the three-stage batch directory state machine
//! - [`reconcile`]: digital-object file-version reconciliation
//!
//! # Example
//!
//! ```no_run
//! use adit_common::Settings;
//! use adit_core::client::RepositoryClient;
//! use adit_core::staging::Batch;
//!
//! #[tokio::main]
//! async fn main() -> adit_common::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let repo = RepositoryClient::connect(&settings.repository).await?;
//!
//!     let batch = Batch::initialize(&settings.staging, "vol1", "2026-08", "ingest")?;
//!     let mut entries = batch.advance(&repo)?;
//!     while let Some(entry) = entries.next_entry().await? {
//!         // process entry.files against entry.record, then:
//!         batch.complete(&entry.path)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod arrangement;
pub mod client;
pub mod eligibility;
pub mod inspect;
pub mod model;
pub mod reconcile;
pub mod staging;
pub mod store;

// Re-export commonly used types
pub use arrangement::Arrangement;
pub use client::RepositoryClient;
pub use eligibility::{classify, EligibilityReport, IdentifierLevel, WorkflowTarget};
pub use model::{CatalogRecord, DigitalObject, FileVersion};
pub use staging::{Batch, BatchStream, StagedEntry};
pub use store::ObjectStore;
