use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};
use sepguard_types::ids;

mod compat_mapping;
mod coredomain;
mod isolated;
mod partition_types;
mod property_types;
mod pseudo_fs_types;
mod utils;
mod violator_attributes;


/// A check returns its violation text; the empty string is a pass.
pub type CheckFn =
    fn(&CheckContext<'_>, &EffectiveConfig, &CheckPolicy) -> Result<String, EngineError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suite {
    /// Path, genfs and domain checks over a single policy.
    Sepolicy,
    /// Vendor/system separation checks, including cross-release compatibility.
    Treble,
}

impl Suite {
    pub fn as_str(self) -> &'static str {
        match self {
            Suite::Sepolicy => "sepolicy",
            Suite::Treble => "treble",
        }
    }
}

#[derive(Debug)]
pub struct CheckSpec {
    pub id: &'static str,
    pub suites: &'static [Suite],
    /// Run when the caller selects nothing explicitly.
    pub default_enabled: bool,
    /// Historical short names accepted by the treble suite.
    pub aliases: &'static [&'static str],
    /// Needs the base/old/mapping/public inputs.
    pub needs_compat: bool,
    pub run: CheckFn,
}

impl CheckSpec {
    pub fn in_suite(&self, suite: Suite) -> bool {
        self.suites.contains(&suite)
    }

    /// The name listed to users of `suite`.
    pub fn display_name(&self, suite: Suite) -> &'static str {
        match (suite, self.aliases.first()) {
            (Suite::Treble, Some(alias)) => alias,
            _ => self.id,
        }
    }

    pub fn answers_to(&self, name: &str) -> bool {
        self.id == name || self.aliases.contains(&name)
    }
}

const SEPOLICY: &[Suite] = &[Suite::Sepolicy];
const TREBLE: &[Suite] = &[Suite::Treble];
const BOTH: &[Suite] = &[Suite::Sepolicy, Suite::Treble];

const fn check(id: &'static str, suites: &'static [Suite], run: CheckFn) -> CheckSpec {
    CheckSpec {
        id,
        suites,
        default_enabled: true,
        aliases: &[],
        needs_compat: false,
        run,
    }
}

/// Every check in run order.
pub static CATALOG: &[CheckSpec] = &[
    check(ids::CHECK_BPFFS_TYPES, SEPOLICY, pseudo_fs_types::bpffs),
    check(ids::CHECK_DATA_TYPES, SEPOLICY, partition_types::data),
    check(ids::CHECK_PROC_TYPES, SEPOLICY, pseudo_fs_types::proc),
    check(ids::CHECK_SYSFS_TYPES, SEPOLICY, pseudo_fs_types::sysfs),
    check(ids::CHECK_SYSTEM_TYPES, SEPOLICY, partition_types::system),
    check(ids::CHECK_DEBUGFS_TYPES, SEPOLICY, pseudo_fs_types::debugfs),
    check(ids::CHECK_TRACEFS_TYPES, SEPOLICY, pseudo_fs_types::tracefs),
    check(ids::CHECK_VENDOR_TYPES, SEPOLICY, partition_types::vendor),
    check(ids::CHECK_CORE_DATA_TYPES, SEPOLICY, partition_types::core_data),
    check(ids::CHECK_PROPERTY_TYPES, SEPOLICY, property_types::run),
    check(ids::CHECK_APP_DATA_TYPES, SEPOLICY, partition_types::app_data),
    check(ids::CHECK_DMA_HEAP_DEV_TYPES, SEPOLICY, partition_types::dma_heap),
    CheckSpec {
        aliases: &["CoredomainViolations"],
        ..check(ids::CHECK_COREDOMAIN, BOTH, coredomain::run)
    },
    CheckSpec {
        aliases: &["CoreDatatypeViolations"],
        ..check(ids::CHECK_VENDOR_DATA_NOT_CORE, TREBLE, partition_types::vendor_data_not_core)
    },
    CheckSpec {
        aliases: &["TrebleCompatMapping"],
        needs_compat: true,
        ..check(ids::CHECK_NO_UNMAPPED_NEW_TYPES, TREBLE, compat_mapping::new_types)
    },
    CheckSpec {
        aliases: &["TrebleCompatMapping"],
        needs_compat: true,
        ..check(ids::CHECK_NO_UNMAPPED_RM_TYPES, TREBLE, compat_mapping::removed_types)
    },
    CheckSpec {
        aliases: &["ViolatorAttributes"],
        ..check(ids::CHECK_VIOLATOR_ATTRIBUTES, TREBLE, violator_attributes::run)
    },
    CheckSpec {
        aliases: &["IsolatedAttributeConsistency"],
        ..check(ids::CHECK_ISOLATED_ATTRIBUTE_CONSISTENCY, BOTH, isolated::run)
    },
    CheckSpec {
        default_enabled: false,
        ..check(ids::CHECK_DEV_TYPES, SEPOLICY, partition_types::dev)
    },
];

pub fn all_check_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|c| c.id)
}

pub fn suite_checks(suite: Suite) -> impl Iterator<Item = &'static CheckSpec> {
    CATALOG.iter().filter(move |c| c.in_suite(suite))
}

/// Names accepted by `suite`, deduplicated, in run order.
pub fn available_names(suite: Suite) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for check in suite_checks(suite) {
        let name = check.display_name(suite);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
