use crate::checks::{self, CheckSpec, Suite};
use crate::context::CheckContext;
use crate::error::EngineError;
use crate::policy::EffectiveConfig;
use sepguard_types::Report;

/// Run the checks of `suite` against `ctx`.
///
/// With no selection, every check enabled by default in the suite runs.
/// Otherwise the named checks run (IDs or the suite's short names), always in
/// catalog order. Checks disabled in `cfg` never run.
pub fn evaluate(
    ctx: &CheckContext<'_>,
    cfg: &EffectiveConfig,
    suite: Suite,
    selected: Option<&[String]>,
) -> Result<Report, EngineError> {
    let plan = plan(suite, selected)?;
    let mut report = Report::new();

    for spec in plan {
        let Some(policy) = cfg.check_policy(spec.id) else {
            tracing::debug!(check = spec.id, "disabled by config");
            continue;
        };
        if spec.needs_compat && ctx.compat.is_none() {
            return Err(EngineError::MissingCompatInputs { check_id: spec.id });
        }
        let message = (spec.run)(ctx, cfg, policy)?;
        tracing::debug!(check = spec.id, pass = message.is_empty(), "check finished");
        if !message.is_empty() {
            report.push(spec.id, message);
        }
    }

    Ok(report)
}

/// The checks `evaluate` would run, before config filtering.
pub fn plan(
    suite: Suite,
    selected: Option<&[String]>,
) -> Result<Vec<&'static CheckSpec>, EngineError> {
    let Some(selected) = selected else {
        return Ok(checks::suite_checks(suite)
            .filter(|c| c.default_enabled)
            .collect());
    };

    for name in selected {
        if !checks::suite_checks(suite).any(|c| c.answers_to(name)) {
            return Err(EngineError::UnknownCheck {
                name: name.clone(),
                available: checks::available_names(suite),
            });
        }
    }

    Ok(checks::suite_checks(suite)
        .filter(|c| selected.iter().any(|name| c.answers_to(name)))
        .collect())
}
