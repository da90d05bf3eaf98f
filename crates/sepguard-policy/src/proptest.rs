//! Property-based tests for type/attribute resolution.

use crate::test_support::PolicyBuilder;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const ATTRS: [&str; 5] = ["domain", "coredomain", "appdomain", "file_type", "exec_type"];

fn arb_types() -> impl Strategy<Value = BTreeMap<String, BTreeSet<&'static str>>> {
    prop::collection::btree_map(
        prop::string::string_regex("t_[a-z]{1,6}").unwrap(),
        prop::collection::btree_set(prop::sample::select(ATTRS.to_vec()), 0..4),
        1..12,
    )
}

proptest! {
    #[test]
    fn attribute_resolution_covers_members_and_their_attributes(types in arb_types()) {
        let mut builder = PolicyBuilder::new();
        for attr in ATTRS {
            builder = builder.attribute(attr);
        }
        for (name, attrs) in &types {
            let attrs: Vec<&str> = attrs.iter().copied().collect();
            builder = builder.typ(name, &attrs);
        }
        let pol = builder.build();

        for attr in ATTRS {
            let resolved = pol.resolve_type_or_attribute(attr);
            let members = pol.query_type_attribute(attr, true).unwrap();
            for member in &members {
                prop_assert!(resolved.contains(member));
                for a in pol.query_type_attribute(member, false).unwrap() {
                    prop_assert!(resolved.contains(&a));
                }
            }
        }

        for (name, attrs) in &types {
            let mut expected: BTreeSet<String> = attrs.iter().map(|a| a.to_string()).collect();
            expected.insert(name.clone());
            prop_assert_eq!(pol.resolve_type_or_attribute(name), expected);
        }
    }

    #[test]
    fn loading_twice_gives_identical_answers(types in arb_types()) {
        let build = || {
            let mut builder = PolicyBuilder::new();
            for (name, attrs) in &types {
                let attrs: Vec<&str> = attrs.iter().copied().collect();
                builder = builder.typ(name, &attrs);
            }
            builder.allow("domain", "file_type", "file", &["read"]).build()
        };
        let first = build();
        let second = build();
        let a: Vec<String> = first
            .query_expanded_te_rules(&crate::TeQuery::new())
            .map(|r| r.raw())
            .collect();
        let b: Vec<String> = second
            .query_expanded_te_rules(&crate::TeQuery::new())
            .map(|r| r.raw())
            .collect();
        prop_assert_eq!(a, b);
    }
}
