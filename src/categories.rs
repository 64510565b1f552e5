// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Category registry: which extensions belong to which destination folder

use tracing::warn;

use crate::config::CategoryConfig;
use crate::{Result, TidyError};

/// Built-in category table
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Pictures", &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"]),
    ("Documents", &[".pdf", ".docx", ".txt", ".csv", ".xlsx", ".pptx"]),
    ("Videos", &[".mp4", ".mov", ".avi", ".mkv", ".wmv"]),
    ("Archives", &[".zip", ".rar", ".tar", ".7z"]),
    ("Audio", &[".mp3", ".wav", ".flac", ".aac"]),
    ("Software", &[".exe", ".msi"]),
    ("Adobe", &[".psd", ".ai"]),
];

/// A named destination folder and the extensions it claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// `ext` must already be normalized (see [`normalize_extension`])
    pub fn claims(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}

/// Ordered category table, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    /// Build from `(name, extensions)` pairs, validating names and
    /// normalizing extensions. Order is preserved.
    pub fn new<I, N, E, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, E)>,
        N: Into<String>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<Category> = Vec::new();

        for (name, extensions) in entries {
            let name = name.into();
            validate_name(&name)?;
            if categories.iter().any(|c| c.name == name) {
                return Err(TidyError::Config(format!("Duplicate category '{}'", name)));
            }

            let mut normalized: Vec<String> = Vec::new();
            for raw in extensions {
                let ext = normalize_extension(raw.as_ref()).ok_or_else(|| {
                    TidyError::Config(format!(
                        "Empty extension in category '{}'",
                        name
                    ))
                })?;
                if !normalized.contains(&ext) {
                    normalized.push(ext);
                }
            }

            categories.push(Category {
                name,
                extensions: normalized,
            });
        }

        let map = Self { categories };
        for (ext, first, second) in map.overlaps() {
            warn!(
                "Extension {} is listed in both '{}' and '{}'; '{}' wins",
                ext, first, second, first
            );
        }
        Ok(map)
    }

    /// Build from the `categories` section of the config file
    pub fn from_config(entries: &[CategoryConfig]) -> Result<Self> {
        Self::new(
            entries
                .iter()
                .map(|c| (c.name.clone(), c.extensions.iter().map(String::as_str))),
        )
    }

    /// Extensions claimed by `category`, if it exists
    pub fn extensions_for(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.extensions())
    }

    /// Category names in iteration order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Extensions claimed by more than one category, as
    /// `(extension, winning category, shadowed category)`
    pub fn overlaps(&self) -> Vec<(&str, &str, &str)> {
        let mut seen: Vec<(&str, &str)> = Vec::new();
        let mut overlaps = Vec::new();
        for category in &self.categories {
            for ext in &category.extensions {
                match seen.iter().find(|(e, _)| *e == ext.as_str()) {
                    Some((_, owner)) => overlaps.push((ext.as_str(), *owner, category.name.as_str())),
                    None => seen.push((ext.as_str(), category.name.as_str())),
                }
            }
        }
        overlaps
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, exts)| Category {
                    name: name.to_string(),
                    extensions: exts.iter().map(|e| e.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CategoryMap {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lower-case an extension and make sure it starts with a single "."
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TidyError::Config("Category name cannot be empty".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TidyError::Config(format!(
            "Category name '{}' is not a plain folder name",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let map = CategoryMap::default();
        assert_eq!(map.len(), 7);
        assert_eq!(
            map.categories().collect::<Vec<_>>(),
            vec!["Pictures", "Documents", "Videos", "Archives", "Audio", "Software", "Adobe"]
        );
        assert!(map.extensions_for("Archives").unwrap().contains(&".7z".to_string()));
        assert!(map.extensions_for("Nope").is_none());
        assert!(map.overlaps().is_empty());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let map = CategoryMap::new([("Images", vec!["JPG", ".Png", ".jpg"])]).unwrap();
        assert_eq!(map.extensions_for("Images").unwrap(), &[".jpg", ".png"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(CategoryMap::new([("", vec![".a"])]).is_err());
        assert!(CategoryMap::new([("..", vec![".a"])]).is_err());
        assert!(CategoryMap::new([("a/b", vec![".a"])]).is_err());
        assert!(CategoryMap::new([("A", vec![".a"]), ("A", vec![".b"])]).is_err());
        assert!(CategoryMap::new([("A", vec!["."])]).is_err());
    }

    #[test]
    fn test_overlaps_reported_in_order() {
        let map = CategoryMap::new([
            ("Bundles", vec![".zip"]),
            ("Archives", vec![".zip", ".rar"]),
        ])
        .unwrap();
        assert_eq!(map.overlaps(), vec![(".zip", "Bundles", "Archives")]);
    }
}
