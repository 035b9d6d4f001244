// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 depsweep contributors

#![no_main]

use depsweep_core::PatternSet;
use libfuzzer_sys::fuzz_target;

// Input: `<exclusions>\n<inclusions>\n<path>`, pattern lists comma-separated.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut parts = s.splitn(3, '\n');
    let (Some(excl), Some(incl), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
        return;
    };

    let split = |list: &str| -> Vec<String> {
        list.split(',')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    };
    let set = PatternSet::new(split(excl), split(incl));

    if let Ok(classifier) = set.compile() {
        let excluded = classifier.is_excluded(path);
        // Anything that matches an inclusion is never excluded.
        if !set.inclusions.is_empty() {
            let inclusions_only = PatternSet::new(set.inclusions.clone(), Vec::new());
            if let Ok(incl) = inclusions_only.compile()
                && incl.is_excluded(path)
            {
                assert!(!excluded);
            }
        }
    }
});
