use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleFlavor {
    Allow,
    AuditAllow,
    DontAudit,
    NeverAllow,
}

impl RuleFlavor {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleFlavor::Allow => "allow",
            RuleFlavor::AuditAllow => "auditallow",
            RuleFlavor::DontAudit => "dontaudit",
            RuleFlavor::NeverAllow => "neverallow",
        }
    }

    /// Only `allow` rules grant access; the others are kept for completeness.
    pub fn grants(self) -> bool {
        matches!(self, RuleFlavor::Allow)
    }
}

impl FromStr for RuleFlavor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(RuleFlavor::Allow),
            "auditallow" => Ok(RuleFlavor::AuditAllow),
            "dontaudit" => Ok(RuleFlavor::DontAudit),
            "neverallow" => Ok(RuleFlavor::NeverAllow),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RuleFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The target keyword meaning "the source type itself".
pub const SELF_TARGET: &str = "self";

/// A type-enforcement rule. Two rules are the same rule iff their content is
/// the same, so a `BTreeSet<TeRule>` deduplicates identical rules.
///
/// A `self` target is kept as written: on an attribute source it stands for
/// one `(t, t)` pair per member, never the cross product.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeRule {
    pub flavor: RuleFlavor,
    pub source: String,
    pub target: String,
    pub class: String,
    pub perms: BTreeSet<String>,
}

impl TeRule {
    pub fn new<I, S>(flavor: RuleFlavor, source: &str, target: &str, class: &str, perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flavor,
            source: source.to_string(),
            target: target.to_string(),
            class: class.to_string(),
            perms: perms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn targets_self(&self) -> bool {
        self.target == SELF_TARGET
    }

    /// Canonical text form, e.g. `allow init vendor_file:file { open read };`.
    pub fn raw(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}:{} ",
            self.flavor, self.source, self.target, self.class
        )?;
        match self.perms.len() {
            1 => {
                let perm = self.perms.iter().next().map(String::as_str).unwrap_or_default();
                write!(f, "{perm};")
            }
            _ => {
                f.write_str("{")?;
                for perm in &self.perms {
                    write!(f, " {perm}")?;
                }
                f.write_str(" };")
            }
        }
    }
}

/// Optional filters for TE rule queries. An empty set is "unset" and matches
/// every rule; a non-empty set must contain the rule's field (or, for perms,
/// intersect the rule's permission set).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeQuery {
    pub sources: BTreeSet<String>,
    pub targets: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub perms: BTreeSet<String>,
}

impl TeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.sources.insert(name.into());
        self
    }

    pub fn sources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.targets.insert(name.into());
        self
    }

    pub fn targets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.insert(name.into());
        self
    }

    pub fn perm(mut self, name: impl Into<String>) -> Self {
        self.perms.insert(name.into());
        self
    }

    pub fn perms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perms.extend(names.into_iter().map(Into::into));
        self
    }

    /// Literal match. A `self` target is read as the rule's source, which is
    /// exact for concrete-type rules; attribute-sourced self rules need the
    /// member-aware matching in [`crate::Policy::query_te_rules`].
    pub fn matches(&self, rule: &TeRule) -> bool {
        let target = if rule.targets_self() {
            &rule.source
        } else {
            &rule.target
        };
        self.matches_except_target(rule)
            && (self.targets.is_empty() || self.targets.contains(target))
    }

    pub(crate) fn matches_except_target(&self, rule: &TeRule) -> bool {
        (self.sources.is_empty() || self.sources.contains(&rule.source))
            && (self.classes.is_empty() || self.classes.contains(&rule.class))
            && (self.perms.is_empty() || !self.perms.is_disjoint(&rule.perms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> TeRule {
        TeRule::new(
            RuleFlavor::Allow,
            "init",
            "vendor_file",
            "file",
            ["read", "open"],
        )
    }

    #[test]
    fn raw_form_is_canonical() {
        assert_eq!(rule().raw(), "allow init vendor_file:file { open read };");
        let single = TeRule::new(RuleFlavor::DontAudit, "a", "b", "dir", ["search"]);
        assert_eq!(single.raw(), "dontaudit a b:dir search;");
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(TeQuery::new().matches(&rule()));
    }

    #[test]
    fn every_given_filter_must_hold() {
        let q = TeQuery::new().source("init").class("file").perm("write").perm("read");
        assert!(q.matches(&rule()));

        let q = TeQuery::new().source("init").perm("write");
        assert!(!q.matches(&rule()));

        let q = TeQuery::new().target("system_file");
        assert!(!q.matches(&rule()));
    }

    #[test]
    fn self_target_reads_as_the_source() {
        let fork = TeRule::new(RuleFlavor::Allow, "init", SELF_TARGET, "process", ["fork"]);
        assert!(fork.targets_self());
        assert_eq!(fork.raw(), "allow init self:process fork;");
        assert!(TeQuery::new().target("init").matches(&fork));
        assert!(!TeQuery::new().target("vendor_init").matches(&fork));
    }
}
