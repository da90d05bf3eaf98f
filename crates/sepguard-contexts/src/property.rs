use crate::error::ContextsError;
use regex::Regex;
use std::sync::LazyLock;

static PROPERTY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+u:object_r:([^:]+):s0.*$").expect("valid property_contexts regex")
});

/// One `name u:object_r:type:s0` line from a property_contexts file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyContextEntry {
    pub name: String,
    pub context_type: String,
    pub raw_line: String,
}

impl PropertyContextEntry {
    /// An empty allow-list accepts everything.
    pub fn is_namespaced<S: AsRef<str>>(
        &self,
        property_prefixes: &[S],
        context_prefixes: &[S],
    ) -> bool {
        let allowed = |value: &str, prefixes: &[S]| {
            prefixes.is_empty() || prefixes.iter().any(|p| value.starts_with(p.as_ref()))
        };
        allowed(&self.name, property_prefixes) && allowed(&self.context_type, context_prefixes)
    }
}

/// Parse property_contexts text. Any malformed non-comment line fails the whole file.
pub fn parse_property_contexts(text: &str) -> Result<Vec<PropertyContextEntry>, ContextsError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let caps = PROPERTY_LINE
            .captures(trimmed)
            .ok_or_else(|| ContextsError::PropertyEntry {
                line: idx + 1,
                text: trimmed.to_string(),
            })?;
        entries.push(PropertyContextEntry {
            name: caps[1].to_string(),
            context_type: caps[2].to_string(),
            raw_line: line.to_string(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# vendor props
ro.vendor.foo          u:object_r:vendor_foo_prop:s0
persist.vendor.bar     u:object_r:vendor_bar_prop:s0 exact string

ro.boot.baz            u:object_r:vendor_default_prop:s0
";

    #[test]
    fn parses_names_and_types() {
        let entries = parse_property_contexts(SAMPLE).expect("parse");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ro.vendor.foo", "persist.vendor.bar", "ro.boot.baz"]);
        assert_eq!(entries[1].context_type, "vendor_bar_prop");
    }

    #[test]
    fn malformed_line_is_fatal() {
        let err = parse_property_contexts("ro.ok u:object_r:a_prop:s0\nro.bad u:r:a_prop:s0\n")
            .expect_err("should fail");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn namespacing_against_prefixes() {
        let entries = parse_property_contexts(SAMPLE).expect("parse");
        let props = ["ro.vendor.", "persist.vendor."];
        let contexts = ["vendor_"];
        let ok: Vec<bool> = entries
            .iter()
            .map(|e| e.is_namespaced(&props, &contexts))
            .collect();
        assert_eq!(ok, vec![true, true, false]);

        let none: [&str; 0] = [];
        assert!(entries[2].is_namespaced(&none, &contexts));
    }
}
