//! Cross-release checks: public types must stay reachable through the
//! compatibility mapping.

use super::utils::sorted_joined;
use crate::context::{CheckContext, CompatInputs};
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};
use sepguard_types::ids;

fn inputs<'a>(
    ctx: &CheckContext<'a>,
    check_id: &'static str,
) -> Result<&'a CompatInputs, EngineError> {
    ctx.compat
        .ok_or(EngineError::MissingCompatInputs { check_id })
}

/// Public types added since the previous release need a mapping entry.
pub fn new_types(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let compat = inputs(ctx, ids::CHECK_NO_UNMAPPED_NEW_TYPES)?;
    let violators = compat
        .base_types
        .difference(&compat.old_types)
        .filter(|t| compat.public_types.contains(*t))
        .filter(|t| !compat.mapping.is_mapped(t))
        .filter(|t| !policy.allow.contains(*t))
        .map(String::as_str);
    let violators = sorted_joined(violators);
    if violators.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(
        "SELinux: The following public types were found added to the policy without an \
         entry into the compatibility mapping file(s) found in \
         private/compat/V.v/V.v[.ignore].cil, where V.v is the latest API level.\n\
         {violators}\n\n\
         See examples of how to fix this:\n\
         https://android-review.googlesource.com/c/platform/system/sepolicy/+/781036\n\
         https://android-review.googlesource.com/c/platform/system/sepolicy/+/852612\n"
    ))
}

/// Public types removed since the previous release must still be declared by
/// the mapping so older vendor policy keeps compiling.
pub fn removed_types(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    policy: &CheckPolicy,
) -> Result<String, EngineError> {
    let compat = inputs(ctx, ids::CHECK_NO_UNMAPPED_RM_TYPES)?;
    let violators = compat
        .old_types
        .difference(&compat.base_types)
        .filter(|t| compat.mapping.public_types.contains(*t))
        .filter(|t| !compat.mapping.types.contains(*t))
        .filter(|t| !policy.allow.contains(*t))
        .map(String::as_str);
    let violators = sorted_joined(violators);
    if violators.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(
        "SELinux: The following formerly public types were removed from policy without a \
         declaration in the compatibility mapping found in \
         private/compat/V.v/V.v[.ignore].cil, where V.v is the latest API level.\n\
         {violators}\n\n\
         See examples of how to fix this:\n\
         https://android-review.googlesource.com/c/platform/system/sepolicy/+/822743\n"
    ))
}
