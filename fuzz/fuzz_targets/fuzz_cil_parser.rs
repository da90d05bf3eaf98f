//! Fuzz target for the compatibility-mapping CIL parser.
//!
//! Goal: the parser should **never panic** on any input.
//! Unbalanced parentheses and bad statements are errors, not crashes.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_cil_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(policy) = sepguard_compat::CilPolicy::parse(text) {
        // Every versioned set name yields a public type.
        for name in policy.attribute_sets.keys() {
            let _ = policy.is_mapped(name);
        }
        let diff = sepguard_compat::FreezeDiff::between::<&str>(&policy, &policy, &[]);
        assert!(diff.is_empty());
    }
});
