// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! tidywatch: keeps a downloads folder sorted
//!
//! Files in a base directory are moved into category subfolders chosen by
//! extension, either on a fixed interval, on debounced filesystem change
//! events, or both.

pub mod categories;
pub mod classifier;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod fs;
pub mod logging;
pub mod mover;
pub mod organizer;
pub mod provision;
pub mod recorder;
pub mod watcher;

pub use categories::CategoryMap;
pub use config::AppConfig;
pub use error::{Result, TidyError};
pub use organizer::{OrganizeTask, Organizer, PassSummary};
