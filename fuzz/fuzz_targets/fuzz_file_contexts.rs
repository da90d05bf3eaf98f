//! Fuzz target for file_contexts parsing and specificity sorting.
//!
//! Goal: parsing and sorting should **never panic** on any input.
//! Malformed lines are expected to come back as errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_file_contexts
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM and keep fuzzing fast
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let outcome = sepguard_contexts::parse_file_contexts(text);
    let mut entries = outcome.entries;
    sepguard_contexts::sort_by_specificity(&mut entries);

    // Sorting must be a total order: every adjacent pair is non-decreasing.
    for pair in entries.windows(2) {
        assert!(pair[0].specificity() <= pair[1].specificity());
    }

    let _ = sepguard_contexts::parse_property_contexts(text);
});
