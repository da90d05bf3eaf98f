//! Per-domain partition classification.
//!
//! One pass over the policy builds a [`DomainRecord`] for every type carrying
//! the `domain` attribute. Records are final once [`DomainClassifier::classify`]
//! returns.

use crate::policy::EffectiveConfig;
use sepguard_contexts::{matches_any_prefix, matches_prefix};
use sepguard_policy::{Policy, PolicyError, TeQuery};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

const VENDOR_PREFIXES: [&str; 2] = ["/vendor", "/odm"];
const SYSTEM_PREFIXES: [&str; 3] = ["/init", "/system_ext", "/product"];
const LEGACY_VENDOR_PREFIX: &str = "/system/vendor";
const SYSTEM_PREFIX: &str = "/system";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DomainRecord {
    pub from_system: bool,
    pub from_vendor: bool,
    pub has_core_attribute: bool,
    pub is_app_domain: bool,
    pub attributes: BTreeSet<String>,
    pub entrypoint_types: Vec<String>,
    pub entrypoint_paths: BTreeSet<String>,
    /// Entry points that fall in no known partition.
    pub errors: Vec<String>,
}

impl DomainRecord {
    fn classify_entrypoints(&mut self, name: &str) {
        for path in &self.entrypoint_paths {
            let mut vendor = matches_any_prefix(path, &VENDOR_PREFIXES);
            let mut system = matches_any_prefix(path, &SYSTEM_PREFIXES);

            // Legacy /system/vendor is vendor, never system.
            if matches_prefix(path, LEGACY_VENDOR_PREFIX) {
                vendor = true;
            } else if matches_prefix(path, SYSTEM_PREFIX) {
                system = true;
            }

            if !vendor && !system {
                self.errors
                    .push(format!("Unrecognized entrypoint for {name} at {path}"));
            }

            self.from_system |= system;
            self.from_vendor |= vendor;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainClassifier {
    domains: BTreeMap<String, DomainRecord>,
}

impl DomainClassifier {
    pub fn classify(pol: &Policy, cfg: &EffectiveConfig) -> Result<Self, PolicyError> {
        let mut domains: BTreeMap<String, DomainRecord> = pol
            .query_type_attribute("domain", true)?
            .into_iter()
            .map(|d| (d, DomainRecord::default()))
            .collect();

        for (name, record) in domains.iter_mut() {
            record.attributes = pol.query_type_attribute(name, false)?;
            record.is_app_domain = record.attributes.contains("appdomain");
            record.has_core_attribute = record.attributes.contains("coredomain");
        }

        let entrypoints = TeQuery::new().class("file").perm("entrypoint");
        for rule in pol.query_expanded_te_rules(&entrypoints) {
            let Some(record) = domains.get_mut(&rule.source) else {
                continue;
            };
            record.entrypoint_types.push(rule.target.clone());
            if cfg.entrypoint_skip_types.contains(&rule.target) {
                continue;
            }
            if let Some(paths) = pol.query_file_contexts_for_type(&rule.target) {
                record.entrypoint_paths.extend(paths.iter().cloned());
            }
        }

        for (name, record) in domains.iter_mut() {
            if cfg.coredomain_allowlist.contains(name) {
                continue;
            }
            if record.is_app_domain {
                // Apps are entered by dynamic transition from zygote, not by exec.
                continue;
            }
            record.classify_entrypoints(name);
        }

        tracing::debug!(domains = domains.len(), "domains classified");
        Ok(Self { domains })
    }

    pub fn domains(&self) -> &BTreeMap<String, DomainRecord> {
        &self.domains
    }

    pub fn get(&self, name: &str) -> Option<&DomainRecord> {
        self.domains.get(name)
    }

    pub fn domains_with_attribute(&self, attribute: &str) -> Vec<&str> {
        self.domains
            .iter()
            .filter(|(_, r)| r.attributes.contains(attribute))
            .map(|(d, _)| d.as_str())
            .collect()
    }

    /// Human-readable listing of every record, sorted by domain.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DomainClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, r) in &self.domains {
            let attrs: Vec<&str> = r.attributes.iter().map(String::as_str).collect();
            writeln!(f, "{name}")?;
            writeln!(f, "\tcoredomain={}", r.has_core_attribute)?;
            writeln!(f, "\tappdomain={}", r.is_app_domain)?;
            writeln!(f, "\tfromSystem={}", r.from_system)?;
            writeln!(f, "\tfromVendor={}", r.from_vendor)?;
            writeln!(f, "\tattributes={}", attrs.join(" "))?;
            writeln!(f, "\tentrypoints={}", r.entrypoint_types.join(" "))?;
            writeln!(f, "\tentrypointpaths=")?;
            for path in &r.entrypoint_paths {
                writeln!(f, "\t\t{path}")?;
            }
        }
        Ok(())
    }
}
