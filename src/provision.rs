// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Folder provisioning: base directory plus one folder per category

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::recorder::Recorder;
use crate::{Result, TidyError};

/// Make sure `base_dir` and `base_dir/<category>` exist for every category.
///
/// Returns the folders that were created by this call; existing folders are
/// left alone and not reported.
pub fn ensure_layout<'a, I>(
    fs: &dyn FileSystem,
    base_dir: &Path,
    categories: I,
    recorder: &dyn Recorder,
) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut created = Vec::new();

    if ensure_dir(fs, base_dir)? {
        recorder.info(&format!("Created folder: {}", base_dir.display()));
        created.push(base_dir.to_path_buf());
    }

    for category in categories {
        let folder = base_dir.join(category);
        if ensure_dir(fs, &folder)? {
            recorder.info(&format!("Created folder: {}", folder.display()));
            created.push(folder);
        }
    }

    Ok(created)
}

/// Create `path` if missing; `Ok(true)` if this call created it
fn ensure_dir(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    if fs.dir_exists(path) {
        return Ok(false);
    }

    match fs.create_dir(path) {
        Ok(()) => Ok(true),
        // Lost a race with another creator
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && fs.dir_exists(path) => Ok(false),
        Err(source) => Err(TidyError::Provision {
            path: path.to_path_buf(),
            source,
        }),
    }
}
