use crate::error::PolicyError;
use crate::rule::{RuleFlavor, TeQuery, TeRule};
use crate::source::PolicySource;
use sepguard_contexts::{
    AnchoredPattern, ContextsError, PathRuleEntry, parse_file_contexts, sort_by_specificity,
};
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

/// The rule database: a compiled policy plus its path-label mappings.
#[derive(Debug)]
pub struct Policy {
    /// type -> attributes, always including the type itself.
    type_attributes: BTreeMap<String, BTreeSet<String>>,
    /// attribute -> concrete member types.
    attribute_members: BTreeMap<String, BTreeSet<String>>,
    rules: BTreeSet<TeRule>,
    expanded: OnceCell<BTreeSet<TeRule>>,
    fc_by_type: BTreeMap<String, Vec<String>>,
    pub(crate) fc_sorted: Vec<PathRuleEntry>,
    fc_anchored: Vec<OnceCell<Option<AnchoredPattern>>>,
    pub(crate) genfs: BTreeMap<String, BTreeSet<String>>,
    fc_errors: Vec<ContextsError>,
}

impl Policy {
    /// Build the database. Malformed file_contexts lines are skipped and kept
    /// in [`Policy::file_context_errors`]; they never fail the load.
    pub fn load<S, T>(source: &S, file_contexts: &[T]) -> Self
    where
        S: PolicySource + ?Sized,
        T: AsRef<str>,
    {
        let attributes = source.attributes();
        let mut type_attributes = source.types();
        let mut attribute_members: BTreeMap<String, BTreeSet<String>> = attributes
            .iter()
            .map(|a| (a.clone(), BTreeSet::new()))
            .collect();

        for (ty, attrs) in type_attributes.iter_mut() {
            for attr in attrs.iter() {
                attribute_members
                    .entry(attr.clone())
                    .or_default()
                    .insert(ty.clone());
            }
            attrs.insert(ty.clone());
        }

        let mut rules = BTreeSet::new();
        let mut skipped = 0usize;
        for rule in source.te_rules() {
            if rule.flavor.grants() {
                rules.insert(rule);
            } else {
                skipped += 1;
            }
        }

        let mut genfs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entry in source.genfs() {
            genfs
                .entry(entry.filesystem)
                .or_default()
                .insert(entry.context.type_name().to_string());
        }

        let mut fc_sorted = Vec::new();
        let mut fc_errors = Vec::new();
        for text in file_contexts {
            let outcome = parse_file_contexts(text.as_ref());
            for err in &outcome.errors {
                tracing::warn!("file_contexts: {err}");
            }
            fc_sorted.extend(outcome.entries);
            fc_errors.extend(outcome.errors);
        }

        let mut fc_by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in &fc_sorted {
            fc_by_type
                .entry(entry.type_name().to_string())
                .or_default()
                .push(entry.pattern.clone());
        }
        sort_by_specificity(&mut fc_sorted);
        let fc_anchored = fc_sorted.iter().map(|_| OnceCell::new()).collect();

        tracing::info!(
            types = type_attributes.len(),
            attributes = attribute_members.len(),
            rules = rules.len(),
            skipped_non_allow = skipped,
            file_contexts = fc_sorted.len(),
            "rule database ready"
        );

        Self {
            type_attributes,
            attribute_members,
            rules,
            expanded: OnceCell::new(),
            fc_by_type,
            fc_sorted,
            fc_anchored,
            genfs,
            fc_errors,
        }
    }

    pub fn file_context_errors(&self) -> &[ContextsError] {
        &self.fc_errors
    }

    /// Path-label entries, least specific first.
    pub fn sorted_file_contexts(&self) -> &[PathRuleEntry] {
        &self.fc_sorted
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.type_attributes.contains_key(name)
    }

    pub fn is_attribute(&self, name: &str) -> bool {
        self.attribute_members.contains_key(name)
    }

    /// All concrete types (`is_attr == false`) or all attributes.
    pub fn all_types(&self, is_attr: bool) -> BTreeSet<String> {
        if is_attr {
            self.attribute_members.keys().cloned().collect()
        } else {
            self.type_attributes.keys().cloned().collect()
        }
    }

    /// Members of an attribute (`is_attr == true`) or attributes of a type.
    ///
    /// Asking for the members of a concrete type yields the type itself, and
    /// asking for the attributes of an attribute yields the attribute itself.
    /// A name the policy does not declare at all is a fatal error.
    pub fn query_type_attribute(
        &self,
        name: &str,
        is_attr: bool,
    ) -> Result<BTreeSet<String>, PolicyError> {
        let found = if is_attr {
            self.attribute_members.get(name).cloned().or_else(|| {
                self.is_type(name)
                    .then(|| BTreeSet::from([name.to_string()]))
            })
        } else {
            self.type_attributes.get(name).cloned().or_else(|| {
                self.is_attribute(name)
                    .then(|| BTreeSet::from([name.to_string()]))
            })
        };
        found.ok_or_else(|| PolicyError::UnknownSymbol(name.to_string()))
    }

    /// Concrete members of a declared attribute, borrowed.
    pub fn members(&self, attribute: &str) -> Option<&BTreeSet<String>> {
        self.attribute_members.get(attribute)
    }

    /// A type resolves to its attributes; an attribute to its members plus
    /// every member's attributes; anything else to the empty set.
    pub fn resolve_type_or_attribute(&self, name: &str) -> BTreeSet<String> {
        if let Some(attrs) = self.type_attributes.get(name) {
            return attrs.clone();
        }
        let Some(members) = self.attribute_members.get(name) else {
            return BTreeSet::new();
        };
        let mut resolved = members.clone();
        for member in members {
            if let Some(attrs) = self.type_attributes.get(member) {
                resolved.extend(attrs.iter().cloned());
            }
        }
        resolved
    }

    fn resolve_query(&self, query: &TeQuery) -> Option<TeQuery> {
        let mut resolved = query.clone();
        if !query.sources.is_empty() {
            resolved.sources = query
                .sources
                .iter()
                .flat_map(|s| self.resolve_type_or_attribute(s))
                .collect();
            if resolved.sources.is_empty() {
                return None;
            }
        }
        if !query.targets.is_empty() {
            resolved.targets = query
                .targets
                .iter()
                .flat_map(|t| self.resolve_type_or_attribute(t))
                .collect();
            if resolved.targets.is_empty() {
                return None;
            }
        }
        Some(resolved)
    }

    /// Rules as written, with source/target filters widened through
    /// [`Policy::resolve_type_or_attribute`]. A filter that resolves to
    /// nothing yields nothing.
    pub fn query_te_rules<'a>(
        &'a self,
        query: &TeQuery,
    ) -> impl Iterator<Item = &'a TeRule> + use<'a> {
        let resolved = self.resolve_query(query);
        self.rules
            .iter()
            .filter(move |rule| resolved.as_ref().is_some_and(|q| self.rule_matches(q, rule)))
    }

    /// A self rule only grants `(t, t)`, so with a target filter some member
    /// of the source has to pass both the source and the target filter.
    fn rule_matches(&self, resolved: &TeQuery, rule: &TeRule) -> bool {
        if !rule.targets_self() {
            return resolved.matches(rule);
        }
        if !resolved.matches_except_target(rule) {
            return false;
        }
        if resolved.targets.is_empty() {
            return true;
        }
        self.concrete_members(&rule.source).any(|t| {
            resolved.targets.contains(t)
                && (resolved.sources.is_empty() || resolved.sources.contains(t))
        })
    }

    /// Rules with every attribute replaced by its member types. Filters are
    /// matched literally.
    pub fn query_expanded_te_rules<'a>(
        &'a self,
        query: &TeQuery,
    ) -> impl Iterator<Item = &'a TeRule> + use<'a> {
        let query = query.clone();
        self.expanded_rules()
            .iter()
            .filter(move |rule| query.matches(rule))
    }

    fn expanded_rules(&self) -> &BTreeSet<TeRule> {
        self.expanded.get_or_init(|| {
            let mut merged: BTreeMap<(RuleFlavor, String, String, String), BTreeSet<String>> =
                BTreeMap::new();
            let mut grant = |rule: &TeRule, s: &str, t: &str| {
                merged
                    .entry((rule.flavor, s.to_string(), t.to_string(), rule.class.clone()))
                    .or_default()
                    .extend(rule.perms.iter().cloned());
            };
            for rule in &self.rules {
                if rule.targets_self() {
                    for s in self.concrete_members(&rule.source) {
                        grant(rule, s, s);
                    }
                    continue;
                }
                for s in self.concrete_members(&rule.source) {
                    for t in self.concrete_members(&rule.target) {
                        grant(rule, s, t);
                    }
                }
            }
            let expanded: BTreeSet<TeRule> = merged
                .into_iter()
                .map(|((flavor, source, target, class), perms)| TeRule {
                    flavor,
                    source,
                    target,
                    class,
                    perms,
                })
                .collect();
            tracing::debug!(rules = expanded.len(), "expanded rule set materialized");
            expanded
        })
    }

    /// An attribute's members, or the name itself for a concrete type.
    fn concrete_members<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self.attribute_members.get(name) {
            Some(members) => Box::new(members.iter().map(String::as_str)),
            None => Box::new(std::iter::once(name)),
        }
    }

    /// Path patterns labeled with `type_name`, in input order.
    pub fn query_file_contexts_for_type(&self, type_name: &str) -> Option<&[String]> {
        self.fc_by_type.get(type_name).map(Vec::as_slice)
    }

    pub(crate) fn exact_pattern(&self, index: usize) -> Option<&AnchoredPattern> {
        self.fc_anchored[index]
            .get_or_init(|| AnchoredPattern::compile(&self.fc_sorted[index].pattern))
            .as_ref()
    }
}
