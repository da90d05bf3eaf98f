//! The conformance suite use cases: load the policy, classify domains, evaluate.

use crate::config::resolve_config_text;
use crate::load::{load_compat, load_policy};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use sepguard_domain::{CheckContext, CompatInputs, DomainClassifier, Suite};
use sepguard_settings::{Overrides, ResolvedConfig};
use sepguard_types::Report;

/// Files the compatibility-mapping checks read. Only required when those
/// checks are going to run.
#[derive(Clone, Debug, Default)]
pub struct CompatPaths {
    /// Current platform-only policy dump.
    pub base_policy: Option<Utf8PathBuf>,
    /// Previous release's policy dump.
    pub old_policy: Option<Utf8PathBuf>,
    /// Compatibility mapping CIL.
    pub mapping: Option<Utf8PathBuf>,
    /// Current platform-only public CIL.
    pub public_policy: Option<Utf8PathBuf>,
}

/// Input for the suite use cases.
#[derive(Clone, Debug)]
pub struct SuiteInput<'a> {
    /// Policy dump of the device under test.
    pub policy: &'a Utf8Path,
    /// Path-label files, in the order given.
    pub file_contexts: &'a [Utf8PathBuf],
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
    /// Checks to run by ID or short name; `None` runs the suite defaults.
    pub tests: Option<Vec<String>>,
    pub compat: CompatPaths,
}

/// Output from a suite run.
#[derive(Clone, Debug)]
pub struct SuiteOutput {
    pub report: Report,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

pub fn run_sepolicy_tests(input: SuiteInput<'_>) -> anyhow::Result<SuiteOutput> {
    run_suite(Suite::Sepolicy, input)
}

pub fn run_treble_tests(input: SuiteInput<'_>) -> anyhow::Result<SuiteOutput> {
    run_suite(Suite::Treble, input)
}

fn run_suite(suite: Suite, input: SuiteInput<'_>) -> anyhow::Result<SuiteOutput> {
    if input.file_contexts.is_empty() {
        anyhow::bail!("must specify at least one file_contexts file");
    }
    let resolved = resolve_config_text(input.config_text, input.overrides.clone())?;

    // Fail on unknown test names before any file is read.
    let plan = sepguard_domain::plan(suite, input.tests.as_deref())?;
    let needs_compat = plan
        .iter()
        .any(|c| c.needs_compat && resolved.effective.check_policy(c.id).is_some());
    let compat = if needs_compat {
        Some(compat_inputs(&input.compat)?)
    } else {
        None
    };

    let policy = load_policy(input.policy, input.file_contexts)?;
    let domains =
        DomainClassifier::classify(&policy, &resolved.effective).context("classify domains")?;
    tracing::info!(
        suite = suite.as_str(),
        domains = domains.domains().len(),
        checks = plan.len(),
        "running suite"
    );

    let ctx = CheckContext {
        policy: &policy,
        domains: &domains,
        compat: compat.as_ref(),
    };
    let report = sepguard_domain::evaluate(&ctx, &resolved.effective, suite, input.tests.as_deref())?;

    Ok(SuiteOutput {
        report,
        resolved_config: resolved,
    })
}

fn compat_inputs(paths: &CompatPaths) -> anyhow::Result<CompatInputs> {
    let base = paths
        .base_policy
        .as_deref()
        .context("must specify the current platform-only policy file")?;
    let mapping = paths
        .mapping
        .as_deref()
        .context("must specify a compatibility mapping file")?;
    let old = paths
        .old_policy
        .as_deref()
        .context("must specify the previous monolithic policy file")?;
    let public = paths
        .public_policy
        .as_deref()
        .context("must specify the current platform-only public policy .cil file")?;
    load_compat(base, old, mapping, public)
}

/// One line per check of `suite`: short name, ID, and whether it runs by default.
pub fn list_checks(suite: Suite) -> String {
    let mut out = String::new();
    for check in sepguard_domain::checks::suite_checks(suite) {
        let name = check.display_name(suite);
        out.push_str(name);
        if name != check.id {
            out.push_str(&format!(" ({})", check.id));
        }
        if !check.default_enabled {
            out.push_str(" [opt-in]");
        }
        out.push('\n');
    }
    out
}
