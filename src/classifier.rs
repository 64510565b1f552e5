// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Extension-based classification

use std::path::Path;

use crate::categories::CategoryMap;

/// Normalized extension of a file name (".jpg"), if it has one.
///
/// Dot-files such as `.bashrc` have no extension. Whitespace is part of the
/// extension, so `"photo.jpg "` is not a ".jpg" file.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// First category, in registry order, that claims the file's extension
pub fn classify<'a>(map: &'a CategoryMap, file_name: &str) -> Option<&'a str> {
    let ext = extension_of(file_name)?;
    map.iter()
        .find(|category| category.claims(&ext))
        .map(|category| category.name())
}
