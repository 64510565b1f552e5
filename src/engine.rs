// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Trigger engine: decides when files get organized
//!
//! A single task multiplexes the interval timer, debounced change events and
//! the shutdown signal, so every move runs on the same worker, one at a time.

use std::future::pending;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::TriggerConfig;
use crate::debounce::Debouncer;
use crate::organizer::Organizer;

/// Timing knobs for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Full-pass period; `None` disables interval mode
    pub interval: Option<Duration>,
    /// Settling delay for change events; `None` disables change-event mode
    pub debounce: Option<Duration>,
    /// Run one pass as soon as the engine starts
    pub scan_on_startup: bool,
}

impl From<&TriggerConfig> for EngineSettings {
    fn from(config: &TriggerConfig) -> Self {
        let interval = config
            .interval_enabled()
            .then(|| Duration::from_secs(config.interval_secs));
        let debounce = config
            .watch_enabled()
            .then(|| Duration::from_secs(config.debounce_secs));
        Self {
            interval,
            debounce,
            scan_on_startup: config.scan_on_startup,
        }
    }
}

enum Wake {
    Signal,
    Shutdown,
    Tick,
    Changed(Option<PathBuf>),
    Due,
}

pub struct TriggerEngine {
    organizer: Organizer,
    settings: EngineSettings,
}

impl TriggerEngine {
    pub fn new(organizer: Organizer, settings: EngineSettings) -> Self {
        Self {
            organizer,
            settings,
        }
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    ///
    /// `changes` carries raw change notifications; it is ignored unless
    /// change-event mode is enabled.
    pub async fn run(
        self,
        changes: Option<UnboundedReceiver<PathBuf>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = self.settings.interval.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        // interval() completes its first tick immediately; swallow it when
        // no startup scan is wanted
        if let Some(t) = ticker.as_mut() {
            if !self.settings.scan_on_startup {
                t.tick().await;
            }
        } else if self.settings.scan_on_startup {
            self.run_pass();
        }

        let mut changes = match self.settings.debounce {
            Some(_) => changes,
            None => None,
        };
        let mut debouncer = Debouncer::new(self.settings.debounce.unwrap_or_default());

        info!(
            "Trigger engine started (interval: {:?}, debounce: {:?})",
            self.settings.interval, self.settings.debounce
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let deadline = debouncer.next_deadline();
            let wake = tokio::select! {
                changed = shutdown.changed() => match changed {
                    Ok(()) => Wake::Signal,
                    Err(_) => Wake::Shutdown,
                },
                _ = next_tick(&mut ticker) => Wake::Tick,
                path = next_change(&mut changes) => Wake::Changed(path),
                _ = wait_until(deadline) => Wake::Due,
            };

            match wake {
                // Re-checked at the top of the loop
                Wake::Signal => {}
                Wake::Shutdown => break,
                Wake::Tick => self.run_pass(),
                Wake::Changed(Some(path)) => {
                    debug!("Debouncing {:?}", path);
                    debouncer.touch(path, Instant::now());
                }
                Wake::Changed(None) => {
                    warn!("Change feed closed; continuing without change events");
                    changes = None;
                }
                Wake::Due => {
                    for path in debouncer.take_due(Instant::now()) {
                        self.organizer.process_changed(&path);
                    }
                }
            }
        }

        if !debouncer.is_empty() {
            debug!("Dropping {} pending change(s) on shutdown", debouncer.len());
        }
        info!("Trigger engine stopped");
    }

    /// One interval tick; enumeration errors only cost this tick
    fn run_pass(&self) {
        if let Err(e) = self.organizer.organize_pass() {
            self.organizer
                .recorder()
                .error(&format!("Error organizing files: {}", e));
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => pending().await,
    }
}

async fn next_change(changes: &mut Option<UnboundedReceiver<PathBuf>>) -> Option<PathBuf> {
    match changes {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(d).await,
        None => pending().await,
    }
}
