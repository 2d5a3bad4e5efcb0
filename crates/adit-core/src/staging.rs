//! Three-stage batch directory state machine
//!
//! A batch root holds `STAGE_1_INITIAL`, `STAGE_2_WORKING`, and
//! `STAGE_3_COMPLETE`. Every transition is a single `rename`, so a
//! crash between stages leaves an entry in exactly one of them and the
//! directory an entry sits in always names its processing phase.

use adit_common::{AditError, Result, StagingConfig};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::arrangement::Arrangement;
use crate::client::RepositoryClient;
use crate::model::CatalogRecord;

pub const STAGE_1_INITIAL: &str = "STAGE_1_INITIAL";
pub const STAGE_2_WORKING: &str = "STAGE_2_WORKING";
pub const STAGE_3_COMPLETE: &str = "STAGE_3_COMPLETE";

/// A batch root on a mounted volume
#[derive(Debug, Clone)]
pub struct Batch {
    root: PathBuf,
    removal_names: Vec<String>,
}

impl Batch {
    /// Claim a volume's source directory as a new batch.
    ///
    /// The source directory is renamed into the new batch root's
    /// STAGE_1_INITIAL and an empty source directory is recreated in
    /// its place, so the source location is immediately reusable.
    /// Stage-directory creation is idempotent, but a batch root that
    /// already holds a STAGE_1_INITIAL is a conflict.
    pub fn initialize(
        config: &StagingConfig,
        volume: &str,
        batch_set_id: &str,
        pipeline: &str,
    ) -> Result<Self> {
        let source_path = config.source_path(volume);
        if !source_path.exists() {
            return Err(AditError::SourceMissing(source_path.display().to_string()));
        }

        let root = config.batch_root(volume, batch_set_id, pipeline);
        debug!(source = %source_path.display(), root = %root.display(), "initializing batch directory");

        fs::create_dir_all(&root)?;
        let initial = root.join(STAGE_1_INITIAL);
        if initial.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("batch root already holds {}", initial.display()),
            )
            .into());
        }

        fs::rename(&source_path, &initial)?;
        fs::create_dir_all(root.join(STAGE_2_WORKING))?;
        fs::create_dir_all(root.join(STAGE_3_COMPLETE))?;
        fs::create_dir(&source_path)?;

        info!(root = %root.display(), "batch directory initialized");
        Ok(Self::attached(root, config))
    }

    /// Re-open an existing batch root, e.g. to resume an interrupted
    /// run. Whatever is still in STAGE_1_INITIAL will be advanced.
    pub fn open(
        config: &StagingConfig,
        volume: &str,
        batch_set_id: &str,
        pipeline: &str,
    ) -> Result<Self> {
        let root = config.batch_root(volume, batch_set_id, pipeline);
        if !root.join(STAGE_1_INITIAL).is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no batch at {}", root.display()),
            )
            .into());
        }
        fs::create_dir_all(root.join(STAGE_2_WORKING))?;
        fs::create_dir_all(root.join(STAGE_3_COMPLETE))?;
        Ok(Self::attached(root, config))
    }

    fn attached(root: PathBuf, config: &StagingConfig) -> Self {
        Self {
            root,
            removal_names: config.files_to_remove.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn stage(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Remove configured filenames anywhere under the batch root.
    /// Runs once per batch, before iteration.
    pub fn sweep_removals(&self) -> Result<Vec<PathBuf>> {
        remove_listed_files(&self.root, &self.removal_names)
    }

    /// Entries currently waiting in STAGE_1_INITIAL, in lexicographic
    /// name order (independent of filesystem iteration order).
    pub fn pending_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(self.stage(STAGE_1_INITIAL))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }

    /// Begin advancing entries out of STAGE_1_INITIAL.
    ///
    /// Runs the housekeeping sweep, then fixes the processing order by
    /// scanning STAGE_1 once. See [`BatchStream`] for the single-pass
    /// semantics of the returned stream.
    pub fn advance<'a>(&'a self, repo: &'a RepositoryClient) -> Result<BatchStream<'a>> {
        let removed = self.sweep_removals()?;
        if !removed.is_empty() {
            info!(count = removed.len(), "removed housekeeping files");
        }
        let pending = self.pending_entries()?;
        debug!(pending = pending.len(), root = %self.root.display(), "batch advance started");
        Ok(BatchStream {
            batch: self,
            repo,
            pending: pending.into(),
        })
    }

    /// Move a STAGE_2 entry into STAGE_3_COMPLETE.
    ///
    /// Called by the consumer once its downstream processing succeeds;
    /// the stream never completes entries on its own, because success
    /// is defined by the consumer's work.
    pub fn complete(&self, entry: &Path) -> Result<PathBuf> {
        let target = self.stage(STAGE_3_COMPLETE).join(entry_name(entry)?);
        fs::rename(entry, &target)?;
        debug!(entry = %target.display(), "entry completed");
        Ok(target)
    }
}

/// One staged entry paired with its catalog data
#[derive(Debug)]
pub struct StagedEntry {
    /// Entry location inside STAGE_2_WORKING
    pub path: PathBuf,

    /// The entry's file set: the entry itself for a file entry, the
    /// files directly inside it for a directory entry (non-recursive),
    /// sorted by name
    pub files: Vec<PathBuf>,

    pub record: CatalogRecord,
    pub arrangement: Arrangement,
}

/// Lazy, ordered advance over a batch's STAGE_1 entries.
///
/// Single-pass and forward-only: each yielded entry has already been
/// moved into STAGE_2_WORKING, so dropping this stream and starting a
/// fresh one will not re-yield it. Resume an interrupted batch with
/// [`Batch::open`] followed by a new [`Batch::advance`], which
/// re-scans whatever is still in STAGE_1_INITIAL.
pub struct BatchStream<'a> {
    batch: &'a Batch,
    repo: &'a RepositoryClient,
    pending: VecDeque<PathBuf>,
}

impl BatchStream<'_> {
    /// Resolve, advance, and yield the next entry.
    ///
    /// Resolution failures (record not found, multiple matches) abort
    /// the run: a staged batch is assumed pre-validated, so an
    /// unresolvable entry is fatal rather than skippable.
    pub async fn next_entry(&mut self) -> Result<Option<StagedEntry>> {
        let Some(initial_path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let component_id = entry_component_id(&initial_path);
        let record = self.repo.find_archival_object(&component_id).await?;
        let arrangement = Arrangement::derive(&record);

        let working_path = self
            .batch
            .stage(STAGE_2_WORKING)
            .join(entry_name(&initial_path)?);
        fs::rename(&initial_path, &working_path)?;

        let files = entry_files(&working_path)?;
        info!(%component_id, files = files.len(), "entry advanced to working stage");

        Ok(Some(StagedEntry {
            path: working_path,
            files,
            record,
            arrangement,
        }))
    }

    /// Entries not yet advanced
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// Component id an entry is named by: the file stem for files, the
/// directory name for directories.
pub fn entry_component_id(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Delete any file under `root` (recursively) whose name appears in
/// `names`; returns what was removed.
pub fn remove_listed_files(root: &Path, names: &[String]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !names.is_empty() {
        walk_remove(root, names, &mut removed)?;
    }
    Ok(removed)
}

fn walk_remove(dir: &Path, names: &[String], removed: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_remove(&path, names, removed)?;
        } else if entry
            .file_name()
            .to_str()
            .is_some_and(|name| names.iter().any(|listed| listed == name))
        {
            fs::remove_file(&path)?;
            removed.push(path);
        }
    }
    Ok(())
}

fn entry_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("entry has no file name: {}", path.display()),
        )
        .into()
    })
}

fn entry_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let child = entry?.path();
        if child.is_file() {
            files.push(child);
        }
    }
    files.sort();
    Ok(files)
}
