// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for tidywatch

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::categories::{CategoryMap, DEFAULT_CATEGORIES};
use crate::{Result, TidyError};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory to organize; `None` means the user's downloads folder
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Category table, in match order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// When to organize
    #[serde(default)]
    pub triggers: TriggerConfig,

    /// Where log output goes
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Which triggers drive the organizer
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Rescan the whole directory on a fixed period
    Interval,
    /// React to filesystem change events after a settling delay
    Watch,
    /// Both of the above
    #[default]
    Both,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    #[serde(default)]
    pub mode: TriggerMode,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
    #[serde(default = "default_true")]
    pub scan_on_startup: bool,
}

/// Log file rotation period
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file; `None` disables the file sink
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub rotation: LogRotation,
    #[serde(default = "default_true")]
    pub console: bool,
}

// Default value functions
fn default_interval_secs() -> u64 { 5 }
fn default_debounce_secs() -> u64 { 5 }
fn default_true() -> bool { true }
fn default_log_file() -> Option<PathBuf> { Some(PathBuf::from("file_organizer.log")) }

fn default_categories() -> Vec<CategoryConfig> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, exts)| CategoryConfig {
            name: name.to_string(),
            extensions: exts.iter().map(|e| e.to_string()).collect(),
        })
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            categories: default_categories(),
            triggers: TriggerConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode: TriggerMode::default(),
            interval_secs: default_interval_secs(),
            debounce_secs: default_debounce_secs(),
            scan_on_startup: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            rotation: LogRotation::default(),
            console: true,
        }
    }
}

impl TriggerConfig {
    pub fn interval_enabled(&self) -> bool {
        matches!(self.mode, TriggerMode::Interval | TriggerMode::Both)
    }

    pub fn watch_enabled(&self) -> bool {
        matches!(self.mode, TriggerMode::Watch | TriggerMode::Both)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_enabled() && self.interval_secs == 0 {
            return Err(TidyError::Config(
                "triggers.interval_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| TidyError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The directory to organize, falling back to the downloads folder
    pub fn resolve_base_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.base_dir {
            return Ok(dir.clone());
        }
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .ok_or_else(|| {
                TidyError::Config(
                    "Cannot locate the downloads directory; set base_dir".to_string(),
                )
            })
    }

    /// Validated, normalized category table
    pub fn category_map(&self) -> Result<CategoryMap> {
        CategoryMap::from_config(&self.categories)
    }

    /// Check everything that can be checked without touching the disk
    pub fn validate(&self) -> Result<()> {
        self.category_map()?;
        self.triggers.validate()
    }
}
