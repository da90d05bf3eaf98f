use crate::error::PolicyError;
use crate::rule::{RuleFlavor, SELF_TARGET, TeRule};
use camino::Utf8Path;
use sepguard_types::SecurityContext;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// One `genfscon` labeling statement.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GenfsEntry {
    pub filesystem: String,
    pub path: String,
    pub context: SecurityContext,
}

/// The compiled-policy query facility, as seen by the rule database.
///
/// Results are eager and owned; the database materializes everything it needs
/// from a source exactly once, at load.
pub trait PolicySource {
    /// Every concrete type, mapped to the attributes it carries.
    fn types(&self) -> BTreeMap<String, BTreeSet<String>>;
    fn attributes(&self) -> BTreeSet<String>;
    fn te_rules(&self) -> Vec<TeRule>;
    fn genfs(&self) -> Vec<GenfsEntry>;
}

/// A policy read from a line-oriented text dump.
///
/// ```text
/// attribute domain
/// type init domain coredomain
/// allow init vendor_file:file { read open };
/// genfscon proc /cmdline u:object_r:proc_cmdline:s0
/// ```
#[derive(Clone, Debug, Default)]
pub struct TextPolicySource {
    types: BTreeMap<String, BTreeSet<String>>,
    attributes: BTreeSet<String>,
    rules: Vec<TeRule>,
    genfs: Vec<GenfsEntry>,
}

enum Statement<'a> {
    Attribute(&'a str),
    Type(&'a str, Vec<&'a str>),
    Rule(TeRule),
    Genfs(GenfsEntry),
}

struct Line<'a> {
    number: usize,
    text: &'a str,
    statement: Statement<'a>,
}

impl TextPolicySource {
    pub fn from_path(path: &Utf8Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_owned(),
            source,
        })?;
        let parsed = text.parse::<Self>()?;
        tracing::info!(
            path = %path,
            types = parsed.types.len(),
            attributes = parsed.attributes.len(),
            rules = parsed.rules.len(),
            "loaded policy dump"
        );
        Ok(parsed)
    }

    fn parse_dump(text: &str) -> Result<Self, PolicyError> {
        let mut lines = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            lines.push(Line {
                number: idx + 1,
                text: trimmed,
                statement: parse_statement(idx + 1, trimmed)?,
            });
        }

        // Declarations first, so rules and types may refer forward.
        let mut out = Self::default();
        for line in &lines {
            match &line.statement {
                Statement::Attribute(name) => {
                    out.attributes.insert((*name).to_string());
                }
                Statement::Type(name, _) => {
                    out.types.entry((*name).to_string()).or_default();
                }
                _ => {}
            }
        }

        for line in lines {
            match line.statement {
                Statement::Attribute(name) => {
                    if out.types.contains_key(name) {
                        return Err(PolicyError::dump(
                            line.number,
                            format!("`{name}` is declared as both a type and an attribute"),
                            line.text,
                        ));
                    }
                }
                Statement::Type(name, attrs) => {
                    for attr in &attrs {
                        if !out.attributes.contains(*attr) {
                            return Err(PolicyError::dump(
                                line.number,
                                format!("undeclared attribute `{attr}`"),
                                line.text,
                            ));
                        }
                    }
                    if let Some(set) = out.types.get_mut(name) {
                        set.extend(attrs.into_iter().map(str::to_string));
                    }
                }
                Statement::Rule(rule) => {
                    let target = (!rule.targets_self()).then_some(&rule.target);
                    for symbol in std::iter::once(&rule.source).chain(target) {
                        if !out.types.contains_key(symbol) && !out.attributes.contains(symbol) {
                            return Err(PolicyError::dump(
                                line.number,
                                format!("undeclared type or attribute `{symbol}`"),
                                line.text,
                            ));
                        }
                    }
                    out.rules.push(rule);
                }
                Statement::Genfs(entry) => {
                    if !out.types.contains_key(entry.context.type_name()) {
                        return Err(PolicyError::dump(
                            line.number,
                            format!("undeclared type `{}`", entry.context.type_name()),
                            line.text,
                        ));
                    }
                    out.genfs.push(entry);
                }
            }
        }

        Ok(out)
    }
}

impl FromStr for TextPolicySource {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_dump(s)
    }
}

impl PolicySource for TextPolicySource {
    fn types(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.types.clone()
    }

    fn attributes(&self) -> BTreeSet<String> {
        self.attributes.clone()
    }

    fn te_rules(&self) -> Vec<TeRule> {
        self.rules.clone()
    }

    fn genfs(&self) -> Vec<GenfsEntry> {
        self.genfs.clone()
    }
}

fn parse_statement(number: usize, text: &str) -> Result<Statement<'_>, PolicyError> {
    let body = text.strip_suffix(';').unwrap_or(text).trim_end();
    let mut tokens = body.split_whitespace();
    let keyword = tokens.next().unwrap_or_default();

    match keyword {
        "attribute" => match (tokens.next(), tokens.next()) {
            (Some(name), None) => Ok(Statement::Attribute(name)),
            _ => Err(PolicyError::dump(number, "expected `attribute <name>`", text)),
        },
        "type" => {
            let name = tokens
                .next()
                .ok_or_else(|| PolicyError::dump(number, "expected `type <name> [attr...]`", text))?;
            Ok(Statement::Type(name, tokens.collect()))
        }
        "genfscon" => {
            let fields: Vec<&str> = tokens.collect();
            let [filesystem, path, context] = fields.as_slice() else {
                return Err(PolicyError::dump(
                    number,
                    "expected `genfscon <fs> <path> <context>`",
                    text,
                ));
            };
            let context = context
                .parse::<SecurityContext>()
                .map_err(|err| PolicyError::dump(number, err.to_string(), text))?;
            Ok(Statement::Genfs(GenfsEntry {
                filesystem: (*filesystem).to_string(),
                path: (*path).to_string(),
                context,
            }))
        }
        other => {
            let flavor = other
                .parse::<RuleFlavor>()
                .map_err(|_| PolicyError::dump(number, format!("unknown statement `{other}`"), text))?;
            parse_rule(number, text, flavor, tokens.collect()).map(Statement::Rule)
        }
    }
}

fn parse_rule(
    number: usize,
    text: &str,
    flavor: RuleFlavor,
    tokens: Vec<&str>,
) -> Result<TeRule, PolicyError> {
    let malformed = || {
        PolicyError::dump(
            number,
            "expected `<flavor> <source> <target>:<class> <perms>`",
            text,
        )
    };

    let [source, target_class, perm_tokens @ ..] = tokens.as_slice() else {
        return Err(malformed());
    };
    let (target, class) = target_class.split_once(':').ok_or_else(malformed)?;
    if target.is_empty() || class.is_empty() {
        return Err(malformed());
    }

    let perms: Vec<&str> = match perm_tokens {
        [single] if !single.starts_with('{') => vec![*single],
        [open, inner @ .., close] if *open == "{" && *close == "}" => inner.to_vec(),
        _ => return Err(malformed()),
    };
    if perms.is_empty() {
        return Err(malformed());
    }

    if *source == SELF_TARGET {
        return Err(malformed());
    }
    Ok(TeRule::new(flavor, source, target, class, perms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
# minimal
attribute domain
attribute file_type
type init domain
type vendor_file file_type
allow init vendor_file:file { read open };
allow domain file_type:dir search;
allow init self:process fork
genfscon proc /cmdline u:object_r:vendor_file:s0
";

    #[test]
    fn parses_every_statement_kind() {
        let src: TextPolicySource = DUMP.parse().expect("parse");
        assert_eq!(src.attributes().len(), 2);
        assert_eq!(
            src.types()["init"],
            BTreeSet::from(["domain".to_string()])
        );
        let rules = src.te_rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].raw(), "allow init vendor_file:file { open read };");
        assert_eq!(rules[1].raw(), "allow domain file_type:dir search;");
        assert_eq!(rules[2].raw(), "allow init self:process fork;");
        assert!(rules[2].targets_self());
        assert_eq!(src.genfs()[0].filesystem, "proc");
    }

    #[test]
    fn self_target_is_kept_on_attribute_sources() {
        let src: TextPolicySource =
            "attribute domain\ntype a domain\ntype b domain\nallow domain self:process fork;\n"
                .parse()
                .expect("parse");
        let rules = src.te_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].source, "domain");
        assert_eq!(rules[0].target, SELF_TARGET);
        assert_eq!(rules[0].raw(), "allow domain self:process fork;");
    }

    #[test]
    fn self_is_not_a_source() {
        assert!("type a\nallow self a:file read;\n".parse::<TextPolicySource>().is_err());
    }

    #[test]
    fn forward_references_are_accepted() {
        let src: TextPolicySource = "allow a b:file read;\ntype a\ntype b\n"
            .parse()
            .expect("parse");
        assert_eq!(src.te_rules().len(), 1);
    }

    #[test]
    fn undeclared_symbol_names_the_line() {
        let err = "type a\nallow a missing:file read;\n"
            .parse::<TextPolicySource>()
            .expect_err("should fail");
        match err {
            PolicyError::Dump { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_rules_are_rejected() {
        for bad in [
            "allow a b read;",
            "allow a b:file;",
            "allow a b:file { read;",
            "allow a b:file { };",
            "permit a b:file read;",
            "genfscon proc / u:object_r:x",
        ] {
            let text = format!("type a\ntype b\ntype x\n{bad}\n");
            assert!(
                text.parse::<TextPolicySource>().is_err(),
                "expected failure for {bad}"
            );
        }
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("policy.dump");
        std::fs::write(&path, DUMP).expect("write");
        let path = camino::Utf8PathBuf::from_path_buf(path).expect("utf8 path");
        let src = TextPolicySource::from_path(&path).expect("load");
        assert_eq!(src.types().len(), 2);

        let missing = TextPolicySource::from_path(&path.with_file_name("nope"));
        assert!(matches!(missing, Err(PolicyError::Read { .. })));
    }
}
