use super::utils::sorted_joined;
use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};

const VIOLATOR_ATTRIBUTES: [&str; 2] = [
    "socket_between_core_and_vendor_violators",
    "vendor_executes_system_violators",
];

pub fn run(
    ctx: &CheckContext<'_>,
    cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    if cfg.fake_treble {
        tracing::debug!("fake treble device; violator attributes tolerated");
        return Ok(String::new());
    }

    let mut ret = String::new();
    for attr in VIOLATOR_ATTRIBUTES {
        let violators = ctx
            .domains
            .domains_with_attribute(attr)
            .into_iter()
            .filter(|d| !policy.allow.iter().any(|a| a.as_str() == *d));
        let violators = sorted_joined(violators);
        if violators.is_empty() {
            continue;
        }
        ret += &format!(
            "SELinux: The following domains violate the Treble ban against use of the \
             {attr} attribute: {violators}\n"
        );
    }
    Ok(ret)
}
