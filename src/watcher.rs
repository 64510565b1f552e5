// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File system watcher for the base directory

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::recorder::Recorder;
use crate::Result;

/// Keeps the platform watch subscription alive; dropping it stops the feed
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ChangeWatcher {
    /// Watch `path` non-recursively, forwarding changed paths to the returned receiver
    pub fn start(
        path: &Path,
        recorder: Arc<dyn Recorder>,
    ) -> Result<(Self, UnboundedReceiver<PathBuf>)> {
        let (tx, rx) = unbounded_channel();

        let config = Config::default().with_poll_interval(Duration::from_secs(2));

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => forward_event(event, &tx),
                Err(e) => recorder.error(&format!("Watch error: {}", e)),
            },
            config,
        )?;

        watcher.watch(path, RecursiveMode::NonRecursive)?;
        info!("Watching: {:?}", path);

        Ok((
            Self {
                _watcher: watcher,
                path: path.to_path_buf(),
            },
            rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Paths from a notify event that deserve an organize attempt
pub fn changed_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => event.paths,
        _ => Vec::new(),
    }
}

fn forward_event(event: Event, tx: &UnboundedSender<PathBuf>) {
    for path in changed_paths(event) {
        debug!("Change: {:?}", path);
        // Receiver gone means the engine has shut down
        if tx.send(path).is_err() {
            return;
        }
    }
}
