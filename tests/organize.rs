// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! End-to-end organizing against a real temporary directory

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio_test::{assert_err, assert_ok};

use tidywatch::engine::{EngineSettings, TriggerEngine};
use tidywatch::fs::{FileSystem, OsFs};
use tidywatch::provision::ensure_layout;
use tidywatch::recorder::{Level, MemoryRecorder};
use tidywatch::watcher::ChangeWatcher;
use tidywatch::{CategoryMap, Organizer, TidyError};

struct Fixture {
    dir: TempDir,
    recorder: Arc<MemoryRecorder>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            recorder: Arc::new(MemoryRecorder::new()),
        }
    }

    fn base(&self) -> PathBuf {
        self.dir.path().join("Downloads")
    }

    fn organizer(&self, map: CategoryMap) -> Organizer {
        self.organizer_on(map, Arc::new(OsFs))
    }

    fn organizer_on(&self, map: CategoryMap, fs: Arc<dyn FileSystem>) -> Organizer {
        Organizer::new(self.base(), Arc::new(map), fs, self.recorder.clone())
    }

    fn touch(&self, name: &str) {
        File::create(self.base().join(name)).expect("Failed to create file");
    }

    fn exists(&self, rel: &str) -> bool {
        self.base().join(rel).is_file()
    }
}

/// Deletes one file right after the scan has seen it, as another process might
struct VanishingFs {
    victim: PathBuf,
}

impl FileSystem for VanishingFs {
    fn dir_exists(&self, path: &Path) -> bool {
        OsFs.dir_exists(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        OsFs.create_dir(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        OsFs.read_dir(path)
    }

    fn is_file(&self, path: &Path) -> io::Result<bool> {
        let result = OsFs.is_file(path);
        if path == self.victim {
            let _ = fs::remove_file(path);
        }
        result
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        OsFs.rename(from, to)
    }
}

#[test]
fn test_pass_moves_known_and_leaves_unknown() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    assert_ok!(organizer.provision());
    fx.touch("photo.JPG");
    fx.touch("report.pdf");
    fx.touch("notes.xyz");

    let summary = organizer.organize_pass().unwrap();

    assert_eq!(summary.moved, 2);
    assert_eq!(summary.unmatched, 1);
    assert!(fx.exists("Pictures/photo.JPG"));
    assert!(fx.exists("Documents/report.pdf"));
    assert!(fx.exists("notes.xyz"));
    assert!(!fx.exists("photo.JPG"));
    assert!(!fx.exists("report.pdf"));
}

#[test]
fn test_provision_creates_layout_once() {
    let fx = Fixture::new();
    let map = CategoryMap::default();
    assert!(!fx.base().exists());

    let created = ensure_layout(&OsFs, &fx.base(), map.categories(), fx.recorder.as_ref()).unwrap();
    assert_eq!(created.len(), 1 + map.len());
    assert!(fx.base().is_dir());
    for name in map.categories() {
        assert!(fx.base().join(name).is_dir(), "missing {}", name);
    }
    let first_records = fx.recorder.messages(Level::Info).len();
    assert_eq!(first_records, 1 + map.len());

    let created = ensure_layout(&OsFs, &fx.base(), map.categories(), fx.recorder.as_ref()).unwrap();
    assert!(created.is_empty());
    assert_eq!(fx.recorder.messages(Level::Info).len(), first_records);
}

#[test]
fn test_first_matching_category_wins() {
    let fx = Fixture::new();
    let map = CategoryMap::new([
        ("Bundles", vec![".zip"]),
        ("Archives", vec![".zip", ".rar", ".tar", ".7z"]),
    ])
    .unwrap();
    let organizer = fx.organizer(map);
    organizer.provision().unwrap();
    fx.touch("archive.zip");

    organizer.organize_pass().unwrap();

    assert!(fx.exists("Bundles/archive.zip"));
    assert!(!fx.exists("Archives/archive.zip"));
}

#[test]
fn test_vanished_file_does_not_stop_the_pass() {
    let fx = Fixture::new();
    let fs = Arc::new(VanishingFs {
        victim: fx.base().join("video.mp4"),
    });
    let organizer = fx.organizer_on(CategoryMap::default(), fs);
    organizer.provision().unwrap();
    fx.touch("video.mp4");
    fx.touch("a.mp3");
    fx.touch("b.png");
    fx.touch("c.zip");

    let summary = organizer.organize_pass().unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.moved, 3);
    assert!(fx.exists("Audio/a.mp3"));
    assert!(fx.exists("Pictures/b.png"));
    assert!(fx.exists("Archives/c.zip"));
    let errors = fx.recorder.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("video.mp4"), "{}", errors[0]);
}

#[test]
fn test_same_category_files_all_land_together() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    organizer.provision().unwrap();
    let names = ["a.mp4", "b.mov", "c.AVI", "d.mkv", "e.wmv"];
    for name in names {
        fx.touch(name);
    }

    organizer.organize_pass().unwrap();

    for name in names {
        assert!(fx.exists(&format!("Videos/{}", name)), "{}", name);
        assert!(!fx.exists(name), "{}", name);
    }
}

#[test]
fn test_subdirectories_are_not_entered() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    organizer.provision().unwrap();
    fs::create_dir(fx.base().join("project.zip")).unwrap();
    File::create(fx.base().join("Pictures").join("already.png")).unwrap();

    let summary = organizer.organize_pass().unwrap();

    assert_eq!(summary.scanned, 0);
    assert!(fx.base().join("project.zip").is_dir());
    assert!(fx.exists("Pictures/already.png"));
}

#[test]
fn test_collision_overwrites_on_unix() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    organizer.provision().unwrap();
    fs::write(fx.base().join("Documents").join("cv.pdf"), b"old").unwrap();
    fs::write(fx.base().join("cv.pdf"), b"new").unwrap();

    organizer.organize_pass().unwrap();

    if cfg!(unix) {
        assert_eq!(fs::read(fx.base().join("Documents").join("cv.pdf")).unwrap(), b"new");
        assert!(!fx.exists("cv.pdf"));
    }
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_does_not_block_the_pass() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    organizer.provision().unwrap();
    std::os::unix::fs::symlink(fx.dir.path().join("gone.iso"), fx.base().join("broken.iso")).unwrap();
    fx.touch("movie.mp4");

    let summary = organizer.organize_pass().unwrap();

    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.moved, 1);
    assert!(fx.exists("Videos/movie.mp4"));
    assert!(fs::symlink_metadata(fx.base().join("broken.iso")).is_ok());
    assert!(fx.recorder.messages(Level::Error).is_empty());
}

#[test]
fn test_missing_base_dir_is_enumeration_error() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());

    let err = assert_err!(organizer.organize_pass());
    assert!(matches!(err, TidyError::Enumeration { .. }));
}

#[tokio::test]
async fn test_change_events_move_settled_file() {
    let fx = Fixture::new();
    let organizer = fx.organizer(CategoryMap::default());
    organizer.provision().unwrap();

    let (watcher, changes) = ChangeWatcher::start(&fx.base(), fx.recorder.clone()).unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = TriggerEngine::new(
        organizer,
        EngineSettings {
            interval: None,
            debounce: Some(Duration::from_millis(200)),
            scan_on_startup: false,
        },
    );
    let handle = tokio::spawn(engine.run(Some(changes), shutdown_rx));

    fs::write(fx.base().join("setup.msi"), b"MZ").unwrap();

    let mut moved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if fx.exists("Software/setup.msi") {
            moved = true;
            break;
        }
    }
    assert!(moved, "setup.msi was not moved: {:?}", fx.recorder.entries());

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    drop(watcher);
}
