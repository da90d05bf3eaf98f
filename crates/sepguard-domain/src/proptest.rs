//! Property-based tests for domain classification and the engine.

use crate::checks::Suite;
use crate::classifier::DomainClassifier;
use crate::engine::evaluate;
use crate::test_support::{Fixture, config, suite_attributes};
use proptest::prelude::*;
use sepguard_policy::Policy;

const PARTITIONS: [&str; 6] = [
    "/system/bin",
    "/vendor/bin",
    "/odm/bin",
    "/product/bin",
    "/system/vendor/bin",
    "/mnt",
];

/// (domain, is core, entry-point directories)
type DomainSpec = (String, bool, Vec<&'static str>);

fn arb_domains() -> impl Strategy<Value = Vec<DomainSpec>> {
    prop::collection::vec(
        (
            prop::string::string_regex("d_[a-z]{1,6}").unwrap(),
            any::<bool>(),
            prop::collection::vec(prop::sample::select(PARTITIONS.to_vec()), 0..3),
        ),
        1..8,
    )
}

fn build(domains: &[DomainSpec]) -> Policy {
    let mut builder = suite_attributes();
    let mut fc = String::new();
    for (name, core, dirs) in domains {
        let attrs: &[&str] = if *core {
            &["domain", "coredomain"]
        } else {
            &["domain"]
        };
        let exec = format!("{name}_exec");
        builder = builder
            .typ(name, attrs)
            .typ(&exec, &["file_type"])
            .allow(name, &exec, "file", &["entrypoint"]);
        for dir in dirs {
            fc.push_str(&format!("{dir}/{name} u:object_r:{exec}:s0\n"));
        }
    }
    builder.file_contexts(&fc).build()
}

proptest! {
    #[test]
    fn classification_is_deterministic(domains in arb_domains()) {
        let first = DomainClassifier::classify(&build(&domains), &config()).unwrap();
        let second = DomainClassifier::classify(&build(&domains), &config()).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.dump(), second.dump());
    }

    #[test]
    fn partition_flags_follow_entry_points(domains in arb_domains()) {
        let classified = DomainClassifier::classify(&build(&domains), &config()).unwrap();
        for record in classified.domains().values() {
            let any_path = !record.entrypoint_paths.is_empty();
            prop_assert!(any_path || !(record.from_system || record.from_vendor));
            for path in &record.entrypoint_paths {
                if path.starts_with("/system/vendor/") || path.starts_with("/vendor/") {
                    prop_assert!(record.from_vendor);
                }
            }
        }
    }

    #[test]
    fn coredomain_report_is_stable(domains in arb_domains()) {
        let fixture = Fixture::new(build(&domains), &config());
        let selected = vec!["CoredomainViolations".to_string()];
        let a = evaluate(&fixture.ctx(), &config(), Suite::Treble, Some(&selected)).unwrap();
        let b = evaluate(&fixture.ctx(), &config(), Suite::Treble, Some(&selected)).unwrap();
        prop_assert_eq!(a.render(), b.render());
    }
}
