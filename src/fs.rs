// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Filesystem primitives used by the organizer
//!
//! Everything that touches the disk goes through [`FileSystem`], so the
//! provisioner, mover and trigger engine can run against [`MemoryFs`] in tests.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The handful of filesystem operations tidywatch needs
pub trait FileSystem: Send + Sync {
    /// True if `path` exists and is a directory
    fn dir_exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Direct entries of `path` (non-recursive), in platform order
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Stat `path`: `Ok(true)` for a regular file, `Ok(false)` for anything else
    fn is_file(&self, path: &Path) -> io::Result<bool>;

    /// Rename `from` to `to` in a single call
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem via `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        Ok(std::fs::metadata(path)?.is_file())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Dir,
    File,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeMap<PathBuf, Node>,
    rename_failures: HashMap<PathBuf, io::ErrorKind>,
    list_failure: Option<io::ErrorKind>,
}

/// In-memory directory tree with POSIX-like rename semantics
///
/// A rename silently replaces an existing destination file, and fails with
/// `NotFound` when the source or the destination's parent is missing.
/// Failures can be injected per source path and for directory listings.
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<MemoryState>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory (and its parents)
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Add a regular file; its parent directories are created as needed
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.lock().nodes.insert(path.to_path_buf(), Node::File);
    }

    /// Remove a file or empty directory, as another process would
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.lock().nodes.remove(path.as_ref()).is_some()
    }

    pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
        self.lock().nodes.get(path.as_ref()) == Some(&Node::File)
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().nodes.get(path.as_ref()) == Some(&Node::Dir)
    }

    /// Regular files directly inside `dir`
    pub fn files_in(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        self.lock()
            .nodes
            .iter()
            .filter(|(p, n)| **n == Node::File && p.parent() == Some(dir))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Make every rename of `source` fail with `kind`
    pub fn fail_rename(&self, source: impl AsRef<Path>, kind: io::ErrorKind) {
        self.lock()
            .rename_failures
            .insert(source.as_ref().to_path_buf(), kind);
    }

    /// Make directory listings fail with `kind` (or succeed again with `None`)
    pub fn fail_listing(&self, kind: Option<io::ErrorKind>) {
        self.lock().list_failure = kind;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MemoryFs {
    fn dir_exists(&self, path: &Path) -> bool {
        self.has_dir(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        for ancestor in path.ancestors() {
            if state.nodes.get(ancestor) == Some(&Node::File) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", ancestor.display()),
                ));
            }
        }
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state.nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        if let Some(kind) = state.list_failure {
            return Err(io::Error::from(kind));
        }
        if state.nodes.get(path) != Some(&Node::Dir) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(state
            .nodes
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        match self.lock().nodes.get(path) {
            Some(node) => Ok(*node == Node::File),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if let Some(kind) = state.rename_failures.get(from) {
            return Err(io::Error::from(*kind));
        }
        if state.nodes.get(from) != Some(&Node::File) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", from.display()),
            ));
        }
        let parent_ok = to
            .parent()
            .map(|p| state.nodes.get(p) == Some(&Node::Dir))
            .unwrap_or(false);
        if !parent_ok {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory for {}", to.display()),
            ));
        }
        if state.nodes.get(to) == Some(&Node::Dir) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", to.display()),
            ));
        }
        state.nodes.remove(from);
        state.nodes.insert(to.to_path_buf(), Node::File);
        Ok(())
    }
}
