//! In-memory policies for tests in this and downstream crates.

use crate::policy::Policy;
use crate::rule::{RuleFlavor, TeRule};
use crate::source::{GenfsEntry, PolicySource};
use sepguard_types::SecurityContext;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    pub types: BTreeMap<String, BTreeSet<String>>,
    pub attributes: BTreeSet<String>,
    pub rules: Vec<TeRule>,
    pub genfs: Vec<GenfsEntry>,
}

impl PolicySource for InMemorySource {
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

#[derive(Clone, Debug, Default)]
pub struct PolicyBuilder {
    source: InMemorySource,
    file_contexts: Vec<String>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.source.attributes.insert(name.to_string());
        self
    }

    /// Declares a type. Attributes it names are declared too.
    pub fn typ(mut self, name: &str, attrs: &[&str]) -> Self {
        let entry = self.source.types.entry(name.to_string()).or_default();
        for attr in attrs {
            entry.insert((*attr).to_string());
            self.source.attributes.insert((*attr).to_string());
        }
        self
    }

    pub fn allow(self, source: &str, target: &str, class: &str, perms: &[&str]) -> Self {
        self.rule(TeRule::new(
            RuleFlavor::Allow,
            source,
            target,
            class,
            perms.iter().copied(),
        ))
    }

    pub fn rule(mut self, rule: TeRule) -> Self {
        self.source.rules.push(rule);
        self
    }

    pub fn genfs(mut self, filesystem: &str, path: &str, type_name: &str) -> Self {
        self.source.genfs.push(GenfsEntry {
            filesystem: filesystem.to_string(),
            path: path.to_string(),
            context: SecurityContext::object(type_name),
        });
        self
    }

    pub fn file_contexts(mut self, text: &str) -> Self {
        self.file_contexts.push(text.to_string());
        self
    }

    pub fn source(&self) -> &InMemorySource {
        &self.source
    }

    pub fn build(self) -> Policy {
        Policy::load(&self.source, self.file_contexts.as_slice())
    }
}
