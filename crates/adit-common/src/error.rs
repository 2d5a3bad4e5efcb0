//! Error types for ADIT
//!
//! One taxonomy shared by every workspace member. Lookup failures carry
//! the identifier that failed; validation failures carry the full
//! aggregated report text.

use thiserror::Error;

/// Result type alias for ADIT operations
pub type Result<T> = std::result::Result<T, AditError>;

/// Comprehensive error type for ADIT operations
#[derive(Error, Debug)]
pub enum AditError {
    /// No catalog record matches a component id
    #[error("Catalog record not found: '{0}'. Verify the component id matches a record in the repository.")]
    RecordNotFound(String),

    /// A component id resolved to more than one catalog record
    #[error("Multiple catalog records found for '{0}'. A component id must resolve to exactly one record; fix the duplicates in the repository.")]
    MultipleMatches(String),

    /// Repository session could not be established
    #[error("Repository authentication failed: {0}. Check REPOSITORY_API_URL and the configured credentials.")]
    Auth(String),

    /// Repository accepted the request but reported an application error
    #[error("Repository reported an error: {0}")]
    Repository(String),

    /// A digital object with the same identifier already exists
    #[error("Digital object id '{0}' already exists in the repository.")]
    DuplicateDigitalObject(String),

    /// Reconciliation found no linked digital object on the record
    #[error("No digital object is linked to '{0}'. Create one before reconciling file versions.")]
    NoDigitalObject(String),

    /// Reconciliation found more than one linked digital object
    #[error("More than one digital object is linked to '{0}'; reconciliation expects exactly one.")]
    MultipleDigitalObjects(String),

    /// Aggregated structural/eligibility violations from a pre-flight pass
    #[error("Validation failed:\n{0}")]
    Validation(String),

    /// The volume's source directory is absent
    #[error("Source path does not exist: '{0}'. Mount the volume and verify SOURCE_SUBDIR.")]
    SourceMissing(String),

    /// Object store call failed
    #[error("Object store error: {0}")]
    Store(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// HTTP transport failure (post-retry, or non-retryable)
    #[error("Network request failed: {0}. Check your connection and the repository URL.")]
    Http(#[from] reqwest::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AditError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a repository application error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create an object store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }
}
