// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tracing setup: console output plus a rotating log file

use chrono::Local;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogRotation};
use crate::{Result, TidyError};

/// `YYYY-MM-DD HH:MM:SS` in local time
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Filter directive for the CLI verbosity flags
pub fn filter_for(verbose: bool, trace: bool, quiet: bool) -> &'static str {
    if trace {
        "trace"
    } else if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `default_filter`. The returned guard flushes the file
/// writer when dropped, so keep it alive until exit.
pub fn init(config: &LogConfig, default_filter: &str) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console = config
        .console
        .then(|| fmt::layer().with_target(false).with_timer(LocalTime));

    let (file, guard) = match &config.file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            let appender = RollingFileAppender::builder()
                .rotation(rotation(config.rotation))
                .filename_prefix(name)
                .build(dir)
                .map_err(|e| TidyError::Logging(format!("{:?}: {}", path, e)))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_timer(LocalTime)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| TidyError::Logging(e.to_string()))?;

    Ok(guard)
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

/// Split a log file path into the appender's directory and file prefix
fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TidyError::Config(format!("Log file {:?} has no file name", path)))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(filter_for(false, false, false), "info");
        assert_eq!(filter_for(true, false, false), "debug");
        assert_eq!(filter_for(true, true, false), "trace");
        assert_eq!(filter_for(false, false, true), "warn");
    }

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("file_organizer.log")).unwrap(),
            (PathBuf::from("."), "file_organizer.log".to_string())
        );
        assert_eq!(
            split_log_path(Path::new("/var/log/tidy/run.log")).unwrap(),
            (PathBuf::from("/var/log/tidy"), "run.log".to_string())
        );
        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_timestamp_format() {
        let mut out = String::new();
        LocalTime.format_time(&mut Writer::new(&mut out)).unwrap();
        assert_eq!(out.len(), 19, "{}", out);
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[10..11], " ");
        assert_eq!(&out[13..14], ":");
    }
}
