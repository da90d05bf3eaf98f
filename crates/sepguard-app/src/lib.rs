//! Use case orchestration for sepguard.
//!
//! This crate provides the application layer: use cases that read the input files, resolve
//! configuration, and hand everything to the pure crates. It is intentionally thin.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod apex;
mod config;
mod domains;
mod fc_sort;
mod freeze;
mod load;
mod prop_prefix;
mod render;
mod suites;

pub use apex::{ApexInput, run_apex_tests};
pub use config::resolve_config_text;
pub use domains::{DumpInput, dump_domains};
pub use fc_sort::sort_file_contexts;
pub use freeze::{FreezeInput, run_freeze_test};
pub use prop_prefix::{PropPrefixInput, PropPrefixOutput, run_property_prefix_check};
pub use render::{OutputFormat, render_report};
pub use suites::{
    CompatPaths, SuiteInput, SuiteOutput, list_checks, run_sepolicy_tests, run_treble_tests,
};

use sepguard_types::Verdict;

/// Exit code for a finished run: 0 when conformant, 2 when violations were found.
///
/// Runtime failures never reach this; the CLI maps them to 1.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_pass_and_fail() {
        assert_eq!(verdict_exit_code(Verdict::Pass), 0);
        assert_eq!(verdict_exit_code(Verdict::Fail), 2);
    }
}
