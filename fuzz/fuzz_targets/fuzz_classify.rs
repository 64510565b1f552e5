// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use libfuzzer_sys::fuzz_target;
use tidywatch::classifier::{classify, extension_of};
use tidywatch::CategoryMap;

fuzz_target!(|name: &str| {
    let map = CategoryMap::default();
    let category = classify(&map, name);
    if let Some(category) = category {
        let ext = extension_of(name).expect("classified names have an extension");
        assert!(map.extensions_for(category).unwrap().contains(&ext));
    }
});
