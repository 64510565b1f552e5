// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classify-and-move pipeline shared by every trigger

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::categories::CategoryMap;
use crate::classifier::{classify, extension_of};
use crate::fs::FileSystem;
use crate::mover::{destination_for, move_file, MoveOutcome};
use crate::provision::ensure_layout;
use crate::recorder::Recorder;
use crate::{Result, TidyError};

/// One "classify and move the file at `path`" unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeTask {
    pub path: PathBuf,
}

impl OrganizeTask {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Counters for one full pass over the base directory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub scanned: usize,
    pub moved: usize,
    pub failed: usize,
    pub unmatched: usize,
}

/// Owns everything needed to organize one base directory
#[derive(Clone)]
pub struct Organizer {
    base_dir: PathBuf,
    categories: Arc<CategoryMap>,
    fs: Arc<dyn FileSystem>,
    recorder: Arc<dyn Recorder>,
    dry_run: bool,
}

impl Organizer {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        categories: Arc<CategoryMap>,
        fs: Arc<dyn FileSystem>,
        recorder: Arc<dyn Recorder>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            categories,
            fs,
            recorder,
            dry_run: false,
        }
    }

    /// Log matches instead of renaming
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn recorder(&self) -> &dyn Recorder {
        self.recorder.as_ref()
    }

    /// Create the base directory and category folders
    pub fn provision(&self) -> Result<Vec<PathBuf>> {
        ensure_layout(
            self.fs.as_ref(),
            &self.base_dir,
            self.categories.categories(),
            self.recorder.as_ref(),
        )
    }

    /// Regular files currently in the base directory, in listing order.
    ///
    /// Entries that are gone by the time they are stat'ed (deleted files,
    /// dangling symlinks) are skipped. Any other listing or stat error fails
    /// the whole scan.
    pub fn scan(&self) -> Result<Vec<OrganizeTask>> {
        let entries = self
            .fs
            .read_dir(&self.base_dir)
            .map_err(|source| TidyError::Enumeration {
                path: self.base_dir.clone(),
                source,
            })?;

        let mut tasks = Vec::new();
        for entry in entries {
            match self.fs.is_file(&entry) {
                Ok(true) => tasks.push(OrganizeTask::new(entry)),
                Ok(false) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Skipping {:?}: {}", entry, e);
                }
                Err(source) => {
                    return Err(TidyError::Enumeration {
                        path: entry,
                        source,
                    })
                }
            }
        }
        Ok(tasks)
    }

    /// Classify one file and move it. `None` when no category claims it.
    pub fn process(&self, task: &OrganizeTask) -> Option<MoveOutcome> {
        let name = task.path.file_name()?.to_string_lossy();

        let category = match classify(&self.categories, &name) {
            Some(c) => c,
            None => {
                debug!("No category for {:?}, leaving it in place", task.path);
                return None;
            }
        };

        let ext = extension_of(&name).unwrap_or_default();
        self.recorder.info(&format!(
            "File {} matches extension {} for folder {}",
            name, ext, category
        ));

        let folder = self.base_dir.join(category);

        if self.dry_run {
            let destination = destination_for(&task.path, &folder);
            self.recorder.info(&format!(
                "DRY RUN: Would move {} to {}",
                task.path.display(),
                destination.display()
            ));
            return Some(MoveOutcome {
                source: task.path.clone(),
                destination,
                failure: None,
            });
        }

        let outcome = move_file(self.fs.as_ref(), &task.path, &folder);
        match &outcome.failure {
            None => self.recorder.info(&format!(
                "Moved file {} to {}",
                outcome.source.display(),
                outcome.destination.display()
            )),
            Some(reason) => self.recorder.error(&format!(
                "Error moving file {} to {}: {}",
                outcome.source.display(),
                outcome.destination.display(),
                reason
            )),
        }
        Some(outcome)
    }

    /// Handle a debounced change notification for `path`.
    ///
    /// The path is re-anchored to `base_dir/<file name>`; anything that is no
    /// longer a regular file there is skipped.
    pub fn process_changed(&self, path: &Path) -> Option<MoveOutcome> {
        let candidate = self.base_dir.join(path.file_name()?);

        match self.fs.is_file(&candidate) {
            Ok(true) => self.process(&OrganizeTask::new(candidate)),
            Ok(false) => {
                debug!("Ignoring change on non-file {:?}", candidate);
                None
            }
            Err(e) => {
                debug!("Changed path {:?} is gone: {}", candidate, e);
                None
            }
        }
    }

    /// Scan the base directory and process every regular file in it.
    ///
    /// Move failures are recorded and counted; they never stop the pass.
    pub fn organize_pass(&self) -> Result<PassSummary> {
        let tasks = self.scan()?;
        let mut summary = PassSummary {
            scanned: tasks.len(),
            ..PassSummary::default()
        };

        for task in &tasks {
            match self.process(task) {
                Some(outcome) if outcome.is_success() => summary.moved += 1,
                Some(_) => summary.failed += 1,
                None => summary.unmatched += 1,
            }
        }

        debug!(
            "Pass over {:?}: {} files, {} moved, {} failed, {} unmatched",
            self.base_dir, summary.scanned, summary.moved, summary.failed, summary.unmatched
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Organizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Organizer")
            .field("base_dir", &self.base_dir)
            .field("categories", &self.categories.len())
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
