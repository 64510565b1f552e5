// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Moving a single file into its category folder

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

/// Result of one move attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Underlying error text when the rename failed
    pub failure: Option<String>,
}

impl MoveOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// `destination_folder/basename(source)`
pub fn destination_for(source: &Path, destination_folder: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => destination_folder.join(name),
        None => destination_folder.to_path_buf(),
    }
}

/// Rename `source` into `destination_folder`.
///
/// Never fails outright: vanished sources, permission problems, cross-device
/// renames and collisions all come back as a failed outcome.
pub fn move_file(fs: &dyn FileSystem, source: &Path, destination_folder: &Path) -> MoveOutcome {
    let destination = destination_for(source, destination_folder);

    let failure = fs.rename(source, &destination).err().map(|e| e.to_string());

    MoveOutcome {
        source: source.to_path_buf(),
        destination,
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use std::io;

    #[test]
    fn test_move_success() {
        let fs = MemoryFs::new();
        fs.add_file("/dl/report.pdf");
        fs.add_dir("/dl/Documents");

        let outcome = move_file(&fs, Path::new("/dl/report.pdf"), Path::new("/dl/Documents"));
        assert!(outcome.is_success());
        assert_eq!(outcome.destination, PathBuf::from("/dl/Documents/report.pdf"));
        assert!(fs.has_file("/dl/Documents/report.pdf"));
        assert!(!fs.has_file("/dl/report.pdf"));
    }

    #[test]
    fn test_vanished_source_is_failure() {
        let fs = MemoryFs::new();
        fs.add_dir("/dl/Videos");

        let outcome = move_file(&fs, Path::new("/dl/video.mp4"), Path::new("/dl/Videos"));
        assert!(!outcome.is_success());
        let reason = outcome.failure.unwrap();
        assert_eq!(reason, io::Error::from(io::ErrorKind::NotFound).to_string());
    }

    #[test]
    fn test_permission_error_carries_reason() {
        let fs = MemoryFs::new();
        fs.add_file("/dl/setup.exe");
        fs.add_dir("/dl/Software");
        fs.fail_rename("/dl/setup.exe", io::ErrorKind::PermissionDenied);

        let outcome = move_file(&fs, Path::new("/dl/setup.exe"), Path::new("/dl/Software"));
        assert!(!outcome.is_success());
        assert!(fs.has_file("/dl/setup.exe"));
    }
}
