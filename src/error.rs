// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for tidywatch

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tidywatch operations
pub type Result<T> = std::result::Result<T, TidyError>;

/// tidywatch error types
#[derive(Error, Debug)]
pub enum TidyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot create folder {path:?}: {source}")]
    Provision {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot list {path:?}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl TidyError {
    /// Process exit code for a fatal error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Provision { .. } => 2,
            Self::Config(_) => 3,
            _ => 1,
        }
    }
}
