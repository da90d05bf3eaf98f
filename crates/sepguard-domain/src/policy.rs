use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckPolicy {
    pub enabled: bool,
    /// Type names the check tolerates.
    pub allow: Vec<String>,
}

impl CheckPolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            allow: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            allow: Vec::new(),
        }
    }

    pub fn with_allow<I, S>(mut self, allow: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow = allow.into_iter().map(Into::into).collect();
        self
    }
}

/// Exceptions for the isolated-app consistency check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsolatedPolicy {
    /// target type -> classes sub-domains may be granted on it.
    pub permissions: BTreeMap<String, BTreeSet<String>>,
    /// Members of these attributes are judged as the attribute name minus its
    /// last `_suffix` (e.g. `hal_codec2_server` -> `hal_codec2`).
    pub hal_server_attributes: Vec<String>,
    /// Members of these attributes are allowed on `compute_allowed_classes`.
    pub compute_allowed_attributes: Vec<String>,
    pub compute_allowed_classes: BTreeSet<String>,
    /// Never allowed through the exception table.
    pub forbidden_perms: BTreeSet<String>,
}

#[derive(Clone, Debug, Default)]
pub struct EffectiveConfig {
    pub profile: String,
    pub checks: BTreeMap<String, CheckPolicy>,
    /// Domains whose entry points are not classified.
    pub coredomain_allowlist: BTreeSet<String>,
    /// Entry-point types with no file_contexts entry by construction.
    pub entrypoint_skip_types: BTreeSet<String>,
    pub isolated: IsolatedPolicy,
    /// Devices launched before the vendor/system split skip violator checks.
    pub fake_treble: bool,
}

impl EffectiveConfig {
    pub fn check_policy(&self, check_id: &str) -> Option<&CheckPolicy> {
        self.checks.get(check_id).filter(|p| p.enabled)
    }
}
