//! The APEX use case: check the path labels of an unpacked APEX against the device policy.
//!
//! The listing is what `deapexer list -Z` prints: one `<path> <context>` pair per line,
//! paths relative to the APEX root (`./`, `./bin/foo`, ...).

use crate::load::{load_policy, read_text};
use camino::Utf8Path;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use sepguard_policy::{Policy, TeQuery};
use sepguard_types::{Report, ids};
use std::collections::BTreeSet;

/// Input for the APEX use case.
#[derive(Clone, Debug)]
pub struct ApexInput<'a> {
    pub policy: &'a Utf8Path,
    /// Output of `deapexer list -Z`.
    pub file_contexts: &'a Utf8Path,
    /// Also run the target-specific rules (every label must be a known type).
    pub all: bool,
}

enum Matcher {
    /// Exact path.
    Is(&'static str),
    /// Component-wise glob, anchored at the end of the path.
    Glob(Vec<GlobMatcher>),
    /// Anchored at the start of the path.
    Regex(Regex),
    /// A non-directory entry under `./bin/`.
    BinaryFile,
}

enum Rule {
    AllowPerm {
        class: &'static str,
        sources: &'static [&'static str],
        perm: &'static str,
    },
    ResolveType,
    NotAnyOf(&'static [&'static str]),
}

fn read(class: &'static str, sources: &'static [&'static str]) -> Rule {
    Rule::AllowPerm {
        class,
        sources,
        perm: "read",
    }
}

/// Path components, ignoring `.` and empty segments; `./etc/` is `["etc"]`.
fn components(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

impl Matcher {
    fn glob(pattern: &str) -> anyhow::Result<Self> {
        let parts = components(pattern)
            .into_iter()
            .map(|c| {
                Ok(GlobBuilder::new(c)
                    .literal_separator(true)
                    .build()?
                    .compile_matcher())
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if parts.is_empty() {
            anyhow::bail!("empty glob pattern: {pattern:?}");
        }
        Ok(Matcher::Glob(parts))
    }

    fn regex(pattern: &str) -> anyhow::Result<Self> {
        Ok(Matcher::Regex(Regex::new(&format!("^(?:{pattern})"))?))
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Matcher::Is(target) => path == *target,
            Matcher::Glob(parts) => {
                let path_parts = components(path);
                parts.len() <= path_parts.len()
                    && parts
                        .iter()
                        .rev()
                        .zip(path_parts.iter().rev())
                        .all(|(glob, part)| glob.is_match(part))
            }
            Matcher::Regex(re) => re.is_match(path),
            Matcher::BinaryFile => path.starts_with("./bin/") && !path.ends_with('/'),
        }
    }
}

impl Rule {
    fn check(
        &self,
        pol: &Policy,
        known_types: &BTreeSet<String>,
        path: &str,
        tcontext: &str,
    ) -> Vec<String> {
        match self {
            Rule::AllowPerm {
                class,
                sources,
                perm,
            } => {
                let mut sources = sources.to_vec();
                sources.sort_unstable();
                sources
                    .into_iter()
                    .filter(|s| {
                        let query = TeQuery::new()
                            .source(*s)
                            .target(tcontext)
                            .class(*class)
                            .perm(*perm);
                        pol.query_te_rules(&query).next().is_none()
                    })
                    .map(|s| format!("Error: {path}: {s} can't {perm}. (tcontext={tcontext})"))
                    .collect()
            }
            Rule::ResolveType => {
                if known_types.contains(tcontext) {
                    Vec::new()
                } else {
                    vec![format!("Error: {path}: tcontext({tcontext}) is unknown")]
                }
            }
            Rule::NotAnyOf(labels) => {
                if labels.contains(&tcontext) {
                    vec![format!("Error: {path}: can't be labelled as '{tcontext}'")]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

fn generic_rules() -> anyhow::Result<Vec<(Matcher, Rule)>> {
    Ok(vec![
        // binaries must be executable
        (Matcher::BinaryFile, Rule::NotAnyOf(&["vendor_file"])),
        // permissions
        (Matcher::Is("./etc/permissions/"), read("dir", &["system_server"])),
        (Matcher::glob("./etc/permissions/*.xml")?, read("file", &["system_server"])),
        // init scripts, optionally with an SDK version (foo.rc, foo.32rc)
        (Matcher::regex(r"\./etc/.*\.\d*rc")?, read("file", &["init"])),
        // vintf fragments
        (Matcher::Is("./etc/vintf/"), read("dir", &["servicemanager", "apexd"])),
        (
            Matcher::glob("./etc/vintf/*.xml")?,
            read("file", &["servicemanager", "apexd"]),
        ),
        // apex root and manifest
        (Matcher::Is("./apex_manifest.pb"), read("file", &["linkerconfig", "apexd"])),
        (
            Matcher::Is("./"),
            Rule::AllowPerm {
                class: "dir",
                sources: &["linkerconfig", "apexd"],
                perm: "search",
            },
        ),
        (Matcher::Is("./etc/linker.config.pb"), read("file", &["linkerconfig"])),
    ])
}

fn rules(all: bool) -> anyhow::Result<Vec<(Matcher, Rule)>> {
    let mut rules = Vec::new();
    if all {
        rules.push((Matcher::glob("*")?, Rule::ResolveType));
    }
    rules.extend(generic_rules()?);
    Ok(rules)
}

fn check_line(
    pol: &Policy,
    known_types: &BTreeSet<String>,
    rules: &[(Matcher, Rule)],
    line: &str,
) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Vec::new();
    }
    let invalid = || vec![format!("Error: invalid file_contexts: {line}")];

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [path, context] = fields.as_slice() else {
        return invalid();
    };
    let context_fields: Vec<&str> = context.split(':').collect();
    let [_, _, tcontext, _] = context_fields.as_slice() else {
        return invalid();
    };

    rules
        .iter()
        .filter(|(matcher, _)| matcher.matches(path))
        .flat_map(|(_, rule)| rule.check(pol, known_types, path, tcontext))
        .collect()
}

/// Every problem becomes one line of a single violation.
pub fn run_apex_tests(input: ApexInput<'_>) -> anyhow::Result<Report> {
    let pol = load_policy(input.policy, &[])?;
    let listing = read_text(input.file_contexts)?;
    let rules = rules(input.all)?;
    let known_types = pol.all_types(false);

    let errors: Vec<String> = listing
        .lines()
        .flat_map(|line| check_line(&pol, &known_types, &rules, line))
        .collect();
    tracing::debug!(errors = errors.len(), all = input.all, "apex file_contexts checked");

    let mut report = Report::new();
    if !errors.is_empty() {
        report.push(ids::CHECK_APEX_FILE_CONTEXTS, errors.join("\n"));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sepguard_policy::test_support::PolicyBuilder;

    fn policy() -> Policy {
        PolicyBuilder::new()
            .attribute("domain")
            .typ("system_server", &["domain"])
            .typ("init", &["domain"])
            .typ("apexd", &["domain"])
            .typ("linkerconfig", &["domain"])
            .typ("servicemanager", &["domain"])
            .typ("system_file", &[])
            .typ("vendor_file", &[])
            .allow("system_server", "system_file", "dir", &["read", "search"])
            .allow("system_server", "system_file", "file", &["read"])
            .allow("init", "system_file", "file", &["read"])
            .allow("apexd", "system_file", "dir", &["search"])
            .allow("apexd", "system_file", "file", &["read"])
            .allow("linkerconfig", "system_file", "dir", &["search"])
            .build()
    }

    fn run(lines: &[&str], all: bool) -> Vec<String> {
        let pol = policy();
        let known = pol.all_types(false);
        let rules = rules(all).expect("rules");
        lines
            .iter()
            .flat_map(|l| check_line(&pol, &known, &rules, l))
            .collect()
    }

    #[test]
    fn glob_matches_components_from_the_right() {
        let m = Matcher::glob("./etc/permissions/*.xml").expect("glob");
        assert!(m.matches("./etc/permissions/foo.xml"));
        assert!(m.matches("./apex/etc/permissions/foo.xml"));
        assert!(!m.matches("./etc/permissions/sub/foo.xml"));
        assert!(!m.matches("./etc/permissions/"));

        let any = Matcher::glob("*").expect("glob");
        assert!(any.matches("./etc/"));
        assert!(any.matches("./bin/foo"));
        assert!(!any.matches("./"));
    }

    #[test]
    fn regex_is_anchored_at_start() {
        let m = Matcher::regex(r"\./etc/.*\.\d*rc").expect("regex");
        assert!(m.matches("./etc/foo.rc"));
        assert!(m.matches("./etc/init/foo.32rc"));
        assert!(!m.matches("./bin/etc/foo.rc"));
    }

    #[test]
    fn clean_listing_passes() {
        let errors = run(
            &[
                "# comment",
                "",
                "./ u:object_r:system_file:s0",
                "./etc/permissions/ u:object_r:system_file:s0",
                "./etc/permissions/foo.xml u:object_r:system_file:s0",
                "./etc/foo.rc u:object_r:system_file:s0",
                "./bin/tool u:object_r:system_file:s0",
            ],
            true,
        );
        assert_eq!(errors, Vec::<String>::new());
    }

    #[test]
    fn missing_search_is_reported_per_source() {
        let errors = run(&["./ u:object_r:vendor_file:s0"], false);
        assert_eq!(
            errors,
            vec![
                "Error: ./: apexd can't search. (tcontext=vendor_file)",
                "Error: ./: linkerconfig can't search. (tcontext=vendor_file)",
            ]
        );
    }

    #[test]
    fn vintf_fragment_must_be_readable_by_servicemanager() {
        let pol = PolicyBuilder::new()
            .attribute("domain")
            .typ("servicemanager", &["domain"])
            .typ("apexd", &["domain"])
            .typ("vendor_configs_file", &[])
            .typ("vendor_file", &[])
            .allow("servicemanager", "vendor_configs_file", "file", &["read"])
            .allow("apexd", "vendor_configs_file", "file", &["read"])
            .allow("apexd", "vendor_file", "file", &["read"])
            .build();
        let known = pol.all_types(false);
        let rules = rules(false).expect("rules");

        let ok = check_line(
            &pol,
            &known,
            &rules,
            "./etc/vintf/fragment.xml u:object_r:vendor_configs_file:s0",
        );
        assert!(ok.is_empty(), "{ok:?}");

        let bad = check_line(
            &pol,
            &known,
            &rules,
            "./etc/vintf/fragment.xml u:object_r:vendor_file:s0",
        );
        assert_eq!(
            bad,
            vec!["Error: ./etc/vintf/fragment.xml: servicemanager can't read. (tcontext=vendor_file)"]
        );
    }

    #[test]
    fn binaries_cannot_be_vendor_file() {
        let errors = run(&["./bin/tool u:object_r:vendor_file:s0"], false);
        assert_eq!(errors, vec!["Error: ./bin/tool: can't be labelled as 'vendor_file'"]);
        assert!(run(&["./bin/ u:object_r:vendor_file:s0"], false).is_empty());
    }

    #[test]
    fn unknown_type_only_checked_with_all() {
        let line = "./lib/libfoo.so u:object_r:made_up_file:s0";
        assert!(run(&[line], false).is_empty());
        assert_eq!(
            run(&[line], true),
            vec!["Error: ./lib/libfoo.so: tcontext(made_up_file) is unknown"]
        );
    }

    #[test]
    fn malformed_lines_are_reported_verbatim() {
        let errors = run(
            &[
                "  ./bin/tool  ",
                "./bin/tool u:object_r:system_file",
                "./a b u:object_r:system_file:s0",
            ],
            false,
        );
        assert_eq!(
            errors,
            vec![
                "Error: invalid file_contexts: ./bin/tool",
                "Error: invalid file_contexts: ./bin/tool u:object_r:system_file",
                "Error: invalid file_contexts: ./a b u:object_r:system_file:s0",
            ]
        );
    }
}
