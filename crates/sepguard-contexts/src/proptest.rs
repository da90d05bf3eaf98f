//! Property-based tests for specificity ordering and prefix matching.

use crate::{PathRuleEntry, compare_specificity, matches_prefix, sort_by_specificity};
use proptest::prelude::*;
use std::cmp::Ordering;

fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z_]{1,8}").unwrap(),
        Just("(/.*)?".to_string()),
        Just(r"foo\.so".to_string()),
        Just("lib(64)?".to_string()),
        Just("[0-9]+".to_string()),
    ]
}

fn arb_pattern() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_segment(), 1..5).prop_map(|segs| format!("/{}", segs.join("/")))
}

fn arb_entry() -> impl Strategy<Value = PathRuleEntry> {
    (
        arb_pattern(),
        prop_oneof![Just(""), Just("-- "), Just("-d ")],
        prop::string::string_regex("[a-z_]{1,12}").unwrap(),
    )
        .prop_map(|(pattern, kind, ty)| {
            let line = format!("{pattern} {kind}u:object_r:{ty}:s0");
            PathRuleEntry::parse(1, &line)
                .expect("generated line parses")
                .expect("generated line is not a comment")
        })
}

proptest! {
    #[test]
    fn comparison_is_antisymmetric(a in arb_entry(), b in arb_entry()) {
        prop_assert_eq!(compare_specificity(&a, &b), compare_specificity(&b, &a).reverse());
    }

    #[test]
    fn comparison_is_transitive(a in arb_entry(), b in arb_entry(), c in arb_entry()) {
        if compare_specificity(&a, &b) != Ordering::Greater
            && compare_specificity(&b, &c) != Ordering::Greater
        {
            prop_assert_ne!(compare_specificity(&a, &c), Ordering::Greater);
        }
    }

    #[test]
    fn sorting_is_idempotent(entries in prop::collection::vec(arb_entry(), 0..16)) {
        let mut once = entries.clone();
        sort_by_specificity(&mut once);
        let mut twice = once.clone();
        sort_by_specificity(&mut twice);
        prop_assert_eq!(&once, &twice);
        for pair in once.windows(2) {
            prop_assert_ne!(compare_specificity(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn literal_pattern_matches_each_of_its_prefixes(
        pattern in prop::string::string_regex("/[a-z]{1,6}(/[a-z]{1,6}){0,3}").unwrap(),
        cut in 0usize..32,
    ) {
        let end = cut.min(pattern.len());
        prop_assert!(matches_prefix(&pattern, &pattern[..end]));
    }
}
