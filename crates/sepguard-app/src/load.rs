//! File loading shared by the use cases.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use sepguard_compat::CilPolicy;
use sepguard_domain::CompatInputs;
use sepguard_policy::{Policy, PolicySource, TextPolicySource};
use std::collections::BTreeSet;

pub(crate) fn read_text(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {path}"))
}

/// Load a policy dump plus its path-label files.
pub(crate) fn load_policy(
    policy_path: &Utf8Path,
    file_contexts: &[Utf8PathBuf],
) -> anyhow::Result<Policy> {
    let source = TextPolicySource::from_path(policy_path)
        .with_context(|| format!("load policy {policy_path}"))?;
    let texts = file_contexts
        .iter()
        .map(|p| read_text(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Policy::load(&source, &texts))
}

fn policy_types(path: &Utf8Path) -> anyhow::Result<BTreeSet<String>> {
    let source =
        TextPolicySource::from_path(path).with_context(|| format!("load policy {path}"))?;
    Ok(source.types().into_keys().collect())
}

pub(crate) fn load_cil(path: &Utf8Path) -> anyhow::Result<CilPolicy> {
    CilPolicy::from_path(path).with_context(|| format!("load CIL {path}"))
}

pub(crate) fn load_compat(
    base_policy: &Utf8Path,
    old_policy: &Utf8Path,
    mapping: &Utf8Path,
    public: &Utf8Path,
) -> anyhow::Result<CompatInputs> {
    Ok(CompatInputs {
        base_types: policy_types(base_policy)?,
        old_types: policy_types(old_policy)?,
        mapping: load_cil(mapping)?,
        public_types: load_cil(public)?.types,
    })
}
