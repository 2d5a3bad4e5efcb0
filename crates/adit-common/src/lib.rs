//! ADIT Common Library
//!
//! Shared error handling, logging, and configuration for the ADIT
//! workspace members.
//!
//! # Overview
//!
//! - **Error Handling**: the `AditError` taxonomy and `Result` alias
//! - **Logging**: tracing subscriber initialization from environment
//! - **Configuration**: typed, environment-backed settings for the
//!   metadata repository, the object store, and the staging filesystem

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{RepositoryConfig, Settings, StagingConfig, StoreConfig};
pub use error::{AditError, Result};
