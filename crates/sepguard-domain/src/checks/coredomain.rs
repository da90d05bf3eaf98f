use super::utils::sorted_joined;
use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};

/// Domains executed off /system must carry `coredomain`; domains executed off
/// /vendor must not. A domain entered from both partitions is ambiguous.
pub fn run(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let mut ret = String::new();
    let domains = ctx
        .domains
        .domains()
        .iter()
        .filter(|(name, _)| !policy.allow.contains(name));

    for (name, record) in domains.clone() {
        if record.from_system && record.from_vendor {
            ret += &format!("The following domain is system and vendor: {name}\n");
        }
    }

    for (_, record) in domains.clone() {
        for error in &record.errors {
            ret += error;
            ret.push('\n');
        }
    }

    let missing = domains
        .clone()
        .filter(|(_, r)| r.from_system && !r.has_core_attribute)
        .map(|(name, _)| name.as_str());
    let missing = sorted_joined(missing);
    if !missing.is_empty() {
        ret += "The following domain(s) must be associated with the \"coredomain\" \
                attribute because they are executed off of /system:\n";
        ret += &missing;
        ret.push('\n');
    }

    let extra = domains
        .filter(|(_, r)| r.from_vendor && r.has_core_attribute)
        .map(|(name, _)| name.as_str());
    let extra = sorted_joined(extra);
    if !extra.is_empty() {
        ret += "The following domains must not be associated with the \"coredomain\" \
                attribute because they are executed off of /vendor or /system/vendor:\n";
        ret += &extra;
        ret.push('\n');
    }

    Ok(ret)
}
