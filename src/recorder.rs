// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Event recorder: the leveled sink every component reports to

use std::sync::Mutex;

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Sink for leveled log entries
pub trait Recorder: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}

/// Routes records into `tracing`, and from there to the console and log file
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl Recorder for TracingRecorder {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in recording order
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Messages recorded at `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// True if any entry at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lock().iter().any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }
}
