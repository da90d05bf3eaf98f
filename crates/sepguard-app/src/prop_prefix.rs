//! The property namespace use case: every property_contexts entry must use an allowed
//! property prefix and an allowed context prefix.

use crate::load::read_text;
use crate::verdict_exit_code;
use anyhow::Context;
use camino::Utf8Path;
use sepguard_contexts::parse_property_contexts;
use sepguard_types::{Report, ids};

const RULE: &str = "******************************";

#[derive(Clone, Debug)]
pub struct PropPrefixInput<'a> {
    pub property_contexts: &'a Utf8Path,
    /// Empty means any property name is allowed.
    pub allowed_property_prefixes: &'a [String],
    /// Empty means any context type is allowed.
    pub allowed_context_prefixes: &'a [String],
    /// Violations fail the run instead of only being printed.
    pub strict: bool,
}

#[derive(Clone, Debug)]
pub struct PropPrefixOutput {
    pub report: Report,
    pub strict: bool,
}

impl PropPrefixOutput {
    /// Violations only fail the run in strict mode.
    pub fn exit_code(&self) -> i32 {
        if self.strict {
            verdict_exit_code(self.report.verdict())
        } else {
            0
        }
    }
}

pub fn run_property_prefix_check(input: PropPrefixInput<'_>) -> anyhow::Result<PropPrefixOutput> {
    let path = input.property_contexts;
    let text = read_text(path)?;
    let entries = parse_property_contexts(&text).with_context(|| format!("parse {path}"))?;

    let violations: Vec<&str> = entries
        .iter()
        .filter(|e| !e.is_namespaced(input.allowed_property_prefixes, input.allowed_context_prefixes))
        .map(|e| e.raw_line.as_str())
        .collect();

    let mut report = Report::new();
    if !violations.is_empty() {
        let mut out = vec![
            RULE.to_string(),
            format!("{} violations found:", violations.len()),
        ];
        out.extend(violations.iter().map(|v| v.to_string()));
        out.push(RULE.to_string());
        out.push(format!(
            "{path} contains properties which are not properly namespaced."
        ));
        out.push("This is enforced by VTS, so please fix such offending properties.".to_string());
        if !input.allowed_property_prefixes.is_empty() {
            out.push(format!(
                "Allowed property prefixes for {path}: {}",
                input.allowed_property_prefixes.join(", ")
            ));
        }
        if !input.allowed_context_prefixes.is_empty() {
            out.push(format!(
                "Allowed context prefixes for {path}: {}",
                input.allowed_context_prefixes.join(", ")
            ));
        }
        if input.strict {
            out.push(
                "You can temporarily disable this check with setting \
                 BUILD_BROKEN_VENDOR_PROPERTY_NAMESPACE := true in BoardConfig.mk."
                    .to_string(),
            );
            out.push(
                "But property namespace is enforced by VTS, and you will need to fix such \
                 violations to pass VTS."
                    .to_string(),
            );
            out.push(
                "See test/vts-testcase/security/system_property/vts_treble_sys_prop_test.py \
                 for the detail of the VTS."
                    .to_string(),
            );
        }
        report.push(ids::CHECK_PROPERTY_PREFIX, out.join("\n"));
    }

    Ok(PropPrefixOutput {
        report,
        strict: input.strict,
    })
}
