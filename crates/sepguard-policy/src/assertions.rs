use crate::error::PolicyError;
use crate::policy::Policy;
use sepguard_contexts::{matches_any_prefix, matches_prefix};
use std::collections::BTreeSet;

fn sorted_joined<S: AsRef<str>>(items: &[S]) -> String {
    let mut sorted: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}

fn joined(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

impl Policy {
    /// Index of the most specific entry whose whole pattern matches `prefix`,
    /// or 0 when none does. Entries before it are shadowed for this prefix.
    fn most_specific_exact_index(&self, prefix: &str) -> usize {
        (0..self.fc_sorted.len())
            .rev()
            .find(|&i| self.exact_pattern(i).is_some_and(|re| re.is_match(prefix)))
            .unwrap_or(0)
    }

    /// Types and patterns reachable from any of `match_prefixes` and not from
    /// any of `exclude_prefixes`.
    pub fn types_and_files_by_prefix<S: AsRef<str>>(
        &self,
        match_prefixes: &[S],
        exclude_prefixes: &[S],
    ) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut types = BTreeSet::new();
        let mut files = BTreeSet::new();

        for prefix in match_prefixes {
            let prefix = prefix.as_ref();
            let start = self.most_specific_exact_index(prefix);
            for entry in &self.fc_sorted[start..] {
                if !matches_prefix(&entry.pattern, prefix) {
                    continue;
                }
                if matches_any_prefix(&entry.pattern, exclude_prefixes) {
                    continue;
                }
                types.insert(entry.type_name().to_string());
                files.insert(entry.pattern.clone());
            }
        }
        (types, files)
    }

    /// Types labeled under `match_prefixes` (minus `exclude_prefixes`) that
    /// lack `attribute`. Empty string means no violation.
    pub fn assert_path_types_have_attribute<S: AsRef<str>>(
        &self,
        match_prefixes: &[S],
        exclude_prefixes: &[S],
        attribute: &str,
        excluded_types: &[S],
    ) -> Result<String, PolicyError> {
        let with_attr = self.query_type_attribute(attribute, true)?;
        let (types, files) = self.types_and_files_by_prefix(match_prefixes, exclude_prefixes);
        let violators: BTreeSet<String> = types
            .difference(&with_attr)
            .filter(|t| !excluded_types.iter().any(|e| e.as_ref() == t.as_str()))
            .cloned()
            .collect();

        Ok(path_report(
            match_prefixes,
            "must be associated with the",
            attribute,
            &violators,
            &files,
        ))
    }

    /// Types labeled under `match_prefixes` (minus `exclude_prefixes`) that
    /// carry `attribute` and are not in `excluded_types`.
    pub fn assert_path_types_do_not_have_attribute<S: AsRef<str>>(
        &self,
        match_prefixes: &[S],
        exclude_prefixes: &[S],
        attribute: &str,
        excluded_types: &[S],
    ) -> Result<String, PolicyError> {
        let with_attr = self.query_type_attribute(attribute, true)?;
        let (types, files) = self.types_and_files_by_prefix(match_prefixes, exclude_prefixes);
        let violators: BTreeSet<String> = types
            .intersection(&with_attr)
            .filter(|t| !excluded_types.iter().any(|e| e.as_ref() == t.as_str()))
            .cloned()
            .collect();

        Ok(path_report(
            match_prefixes,
            "must not be associated with the",
            attribute,
            &violators,
            &files,
        ))
    }

    /// Types labeled by `genfscon` statements for `filesystem` that lack
    /// `attribute`. A filesystem with no statements has nothing to check.
    pub fn assert_genfs_filesystem_types_have_attribute(
        &self,
        filesystem: &str,
        attribute: &str,
    ) -> Result<String, PolicyError> {
        let with_attr = self.query_type_attribute(attribute, true)?;
        let Some(genfs_types) = self.genfs.get(filesystem) else {
            tracing::debug!(filesystem, "no genfs entries for filesystem");
            return Ok(String::new());
        };
        let violators: BTreeSet<String> = genfs_types.difference(&with_attr).cloned().collect();
        if violators.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "The following types in {filesystem} must be associated with the \"{attribute}\" attribute: {}\n",
            joined(&violators)
        ))
    }

    pub fn assert_property_owners_are_exclusive(&self) -> Result<String, PolicyError> {
        let system = self.query_type_attribute("system_property_type", true)?;
        let vendor = self.query_type_attribute("vendor_property_type", true)?;
        let violators: BTreeSet<String> = system.intersection(&vendor).cloned().collect();
        if violators.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "The following types have both system_property_type and vendor_property_type: {}\n",
            joined(&violators)
        ))
    }
}

fn path_report<S: AsRef<str>>(
    match_prefixes: &[S],
    verb: &str,
    attribute: &str,
    violators: &BTreeSet<String>,
    files: &BTreeSet<String>,
) -> String {
    if violators.is_empty() {
        return String::new();
    }
    format!(
        "The following types on {} {verb} \"{attribute}\" attribute: {}\n corresponding to files: {}\n",
        sorted_joined(match_prefixes),
        joined(violators),
        joined(files)
    )
}
