//! Directory inspection and pre-flight validation
//!
//! [`inspect`] examines one level of a directory; [`validate_staging_tree`]
//! runs the full pre-flight over a volume's source area, collecting
//! every structural and eligibility violation before reporting, so a
//! single pass surfaces everything an operator has to fix.

use adit_common::{AditError, Result, StagingConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::client::RepositoryClient;
use crate::eligibility::{classify_component, EligibilityReport, IdentifierLevel};
use crate::model::CatalogRecord;
use crate::staging::{entry_component_id, remove_listed_files};

/// What one level of a directory looks like
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DirectoryReport {
    pub has_nested_subdirectory: bool,
    pub is_empty_of_files: bool,
    pub file_count: usize,
}

/// Examine only the immediate children of `directory`; never recurses.
pub fn inspect(directory: &Path) -> io::Result<DirectoryReport> {
    let mut report = DirectoryReport {
        has_nested_subdirectory: false,
        is_empty_of_files: true,
        file_count: 0,
    };

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            report.has_nested_subdirectory = true;
        } else if file_type.is_file() {
            report.is_empty_of_files = false;
            report.file_count += 1;
        }
    }

    Ok(report)
}

/// Validity checks supplied by the caller at invocation time.
///
/// The defaults accept everything; a pipeline narrows whichever
/// capability it cares about.
pub trait StagingPolicy {
    /// Whether a staged file's type is supported by the pipeline.
    fn supports_file(&self, path: &Path) -> bool {
        let _ = path;
        true
    }

    /// Whether a resolved record may be staged by the pipeline.
    fn record_eligible(&self, record: &CatalogRecord) -> bool {
        let _ = record;
        true
    }
}

/// Accepts every file and every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl StagingPolicy for DefaultPolicy {}

/// Restricts staged files to a set of extensions (case-insensitive).
#[derive(Debug, Clone)]
pub struct ExtensionPolicy {
    extensions: Vec<String>,
}

impl ExtensionPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl StagingPolicy for ExtensionPolicy {
    fn supports_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// Exhaustive pre-flight report over a volume's source area
#[derive(Debug, Serialize)]
pub struct StagingReport {
    pub source_path: PathBuf,

    /// Component id -> fully resolved record
    pub eligible: BTreeMap<String, CatalogRecord>,

    /// Component ids that did not resolve, or that the policy rejected
    pub ineligible: Vec<String>,

    /// Directory entries containing subdirectories
    pub nested_directories: Vec<PathBuf>,

    /// Directory entries containing no files
    pub empty_directories: Vec<PathBuf>,

    /// Files the policy does not support
    pub unsupported_files: Vec<PathBuf>,

    /// Total files at the first level and inside directory entries
    pub file_count: usize,
}

impl StagingReport {
    fn new(source_path: PathBuf) -> Self {
        Self {
            source_path,
            eligible: BTreeMap::new(),
            ineligible: Vec::new(),
            nested_directories: Vec::new(),
            empty_directories: Vec::new(),
            unsupported_files: Vec::new(),
            file_count: 0,
        }
    }

    /// Every violation the pass collected, one line each.
    pub fn violation_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for component_id in &self.ineligible {
            lines.push(format!("record not resolvable: {component_id}"));
        }
        for path in &self.nested_directories {
            lines.push(format!("directory contains subdirectories: {}", path.display()));
        }
        for path in &self.empty_directories {
            lines.push(format!("directory contains no files: {}", path.display()));
        }
        for path in &self.unsupported_files {
            lines.push(format!("unsupported file type: {}", path.display()));
        }
        if self.file_count == 0 {
            lines.push(format!(
                "no files found under {}",
                self.source_path.display()
            ));
        }
        lines
    }

    /// Surface all collected violations as one validation failure.
    pub fn ensure_valid(&self) -> Result<()> {
        let lines = self.violation_lines();
        if lines.is_empty() {
            Ok(())
        } else {
            Err(AditError::Validation(lines.join("\n")))
        }
    }
}

/// Run the pre-flight over `<mount>/<volume>/<source_subdir>`.
///
/// Inspection never aborts on the first violation; the whole tree is
/// walked and everything wrong is reported at once. Record ambiguity
/// (multiple matches for one component id) stays fatal.
pub async fn validate_staging_tree(
    repo: &RepositoryClient,
    config: &StagingConfig,
    volume: &str,
    policy: &dyn StagingPolicy,
) -> Result<StagingReport> {
    let source_path = config.source_path(volume);
    if !source_path.exists() {
        return Err(AditError::SourceMissing(source_path.display().to_string()));
    }

    let removed = remove_listed_files(&source_path, &config.files_to_remove)?;
    if !removed.is_empty() {
        debug!(count = removed.len(), "removed housekeeping files before inspection");
    }

    let mut report = StagingReport::new(source_path.clone());
    let mut entries: Vec<PathBuf> = fs::read_dir(&source_path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        let component_id = entry_component_id(&path);
        let mut candidate = EligibilityReport {
            identifier_level: IdentifierLevel::ArchivalObject,
            eligible: BTreeMap::new(),
            ineligible: Vec::new(),
        };
        classify_component(repo, &component_id, &mut candidate).await?;
        for (id, record) in candidate.eligible {
            if policy.record_eligible(&record) {
                report.eligible.insert(id, record);
            } else {
                report.ineligible.push(id);
            }
        }
        report.ineligible.extend(candidate.ineligible);

        if path.is_file() {
            report.file_count += 1;
            if !policy.supports_file(&path) {
                report.unsupported_files.push(path.clone());
            }
        } else if path.is_dir() {
            let inspection = inspect(&path)?;
            if inspection.has_nested_subdirectory {
                report.nested_directories.push(path.clone());
            }
            if inspection.is_empty_of_files {
                report.empty_directories.push(path.clone());
            }
            report.file_count += inspection.file_count;

            for child in fs::read_dir(&path)? {
                let child = child?.path();
                if child.is_file() && !policy.supports_file(&child) {
                    report.unsupported_files.push(child);
                }
            }
        }
    }

    info!(
        files = report.file_count,
        eligible = report.eligible.len(),
        ineligible = report.ineligible.len(),
        nested = report.nested_directories.len(),
        empty = report.empty_directories.len(),
        "staging tree inspected"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_flags_nested_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("page-1.tif"), b"data").unwrap();

        let report = inspect(dir.path()).unwrap();
        assert!(report.has_nested_subdirectory);
        assert!(!report.is_empty_of_files);
        assert_eq!(report.file_count, 1);
    }

    #[test]
    fn test_inspect_flags_empty_directory() {
        let dir = TempDir::new().unwrap();

        let report = inspect(dir.path()).unwrap();
        assert!(!report.has_nested_subdirectory);
        assert!(report.is_empty_of_files);
        assert_eq!(report.file_count, 0);
    }

    #[test]
    fn test_inspect_single_file_is_clean() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("page-1.tif"), b"data").unwrap();

        let report = inspect(dir.path()).unwrap();
        assert!(!report.has_nested_subdirectory);
        assert!(!report.is_empty_of_files);
    }

    #[test]
    fn test_extension_policy() {
        let policy = ExtensionPolicy::new(["tif", "PDF"]);
        assert!(policy.supports_file(Path::new("/in/item.TIF")));
        assert!(policy.supports_file(Path::new("/in/item.pdf")));
        assert!(!policy.supports_file(Path::new("/in/item.docx")));
        assert!(!policy.supports_file(Path::new("/in/noextension")));
    }

    #[test]
    fn test_report_collects_all_violations() {
        let mut report = StagingReport::new(PathBuf::from("/mnt/vol1/source"));
        report.ineligible.push("item-9".to_string());
        report.nested_directories.push(PathBuf::from("/mnt/vol1/source/item-3"));
        report.empty_directories.push(PathBuf::from("/mnt/vol1/source/item-4"));
        report.file_count = 2;

        let lines = report.violation_lines();
        assert_eq!(lines.len(), 3);
        assert!(matches!(report.ensure_valid(), Err(AditError::Validation(_))));

        let message = report.ensure_valid().unwrap_err().to_string();
        assert!(message.contains("item-9"));
        assert!(message.contains("item-3"));
        assert!(message.contains("item-4"));
    }

    #[test]
    fn test_clean_report_is_valid() {
        let mut report = StagingReport::new(PathBuf::from("/mnt/vol1/source"));
        report.file_count = 3;
        assert!(report.ensure_valid().is_ok());
    }
}
