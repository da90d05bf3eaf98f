use crate::classifier::DomainClassifier;
use sepguard_compat::CilPolicy;
use sepguard_policy::Policy;
use std::collections::BTreeSet;

/// Inputs for the compatibility-mapping checks.
#[derive(Clone, Debug, Default)]
pub struct CompatInputs {
    /// Types of the current platform-only policy.
    pub base_types: BTreeSet<String>,
    /// Types of the previous release's policy.
    pub old_types: BTreeSet<String>,
    pub mapping: CilPolicy,
    /// Types declared in the current platform public CIL.
    pub public_types: BTreeSet<String>,
}

/// Everything a check may read. Nothing here is mutated by checks.
#[derive(Clone, Copy, Debug)]
pub struct CheckContext<'a> {
    pub policy: &'a Policy,
    pub domains: &'a DomainClassifier,
    pub compat: Option<&'a CompatInputs>,
}
