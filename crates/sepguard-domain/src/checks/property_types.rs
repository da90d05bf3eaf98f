use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::{CheckPolicy, EffectiveConfig};

/// A property type is owned by system or by vendor, never both.
pub fn run(
    ctx: &CheckContext<'_>,
    _cfg: &EffectiveConfig,
    _policy: &CheckPolicy,
) -> Result<String, EngineError> {
    Ok(ctx.policy.assert_property_owners_are_exclusive()?)
}
