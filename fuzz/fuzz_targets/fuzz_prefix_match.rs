//! Fuzz target for path-pattern prefix matching.
//!
//! Goal: the prefix matcher should **never panic**, including on patterns that are not
//! valid regexes.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_prefix_match
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct PrefixInput {
    /// A file_contexts path pattern (e.g. "/data(/.*)?")
    pattern: String,
    /// Prefixes to test against it (e.g. "/data/vendor")
    prefixes: Vec<String>,
}

fuzz_target!(|input: PrefixInput| {
    if input.pattern.len() > 256 || input.prefixes.len() > 16 {
        return;
    }
    let prefixes: Vec<String> = input
        .prefixes
        .into_iter()
        .filter(|p| p.len() <= 256)
        .collect();

    for prefix in &prefixes {
        let _ = sepguard_contexts::matches_prefix(&input.pattern, prefix);
    }
    let _ = sepguard_contexts::matches_any_prefix(&input.pattern, &prefixes);
    let _ = sepguard_contexts::stem_len(&input.pattern);
    let _ = sepguard_contexts::is_meta(&input.pattern);
});
