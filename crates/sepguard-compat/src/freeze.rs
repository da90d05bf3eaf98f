use crate::mapping::CilPolicy;
use std::collections::BTreeSet;
use std::fmt;

/// Compiler-generated attributes are not part of the public surface.
const GENERATED_ATTRIBUTE_MARKER: &str = "base_typeattr_";

/// Public types and attributes that differ between the current public CIL
/// and the frozen prebuilt one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreezeDiff {
    pub removed_types: BTreeSet<String>,
    pub added_types: BTreeSet<String>,
    pub removed_attributes: BTreeSet<String>,
    pub added_attributes: BTreeSet<String>,
}

fn public_attributes(policy: &CilPolicy) -> BTreeSet<String> {
    policy
        .type_attributes
        .iter()
        .filter(|a| !a.contains(GENERATED_ATTRIBUTE_MARKER))
        .cloned()
        .collect()
}

impl FreezeDiff {
    /// `ignored_added_types` are tolerated additions that are known to be
    /// in the process of being removed.
    pub fn between<S: AsRef<str>>(
        current: &CilPolicy,
        prebuilt: &CilPolicy,
        ignored_added_types: &[S],
    ) -> Self {
        let current_attrs = public_attributes(current);
        let prebuilt_attrs = public_attributes(prebuilt);
        Self {
            removed_types: prebuilt.types.difference(&current.types).cloned().collect(),
            added_types: current
                .types
                .difference(&prebuilt.types)
                .filter(|t| !ignored_added_types.iter().any(|i| i.as_ref() == t.as_str()))
                .cloned()
                .collect(),
            removed_attributes: prebuilt_attrs.difference(&current_attrs).cloned().collect(),
            added_attributes: current_attrs.difference(&prebuilt_attrs).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed_types.is_empty()
            && self.added_types.is_empty()
            && self.removed_attributes.is_empty()
            && self.added_attributes.is_empty()
    }
}

impl fmt::Display for FreezeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("The following public types were removed:", &self.removed_types),
            ("The following public types were added:", &self.added_types),
            ("The following public attributes were removed:", &self.removed_attributes),
            ("The following public attributes were added:", &self.added_attributes),
        ];
        for (header, names) in sections {
            if names.is_empty() {
                continue;
            }
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            writeln!(f, "{header}\n{}", names.join(", "))?;
        }
        if !self.is_empty() {
            write!(
                f,
                "\n******************************\n\
                 You have tried to change system/sepolicy/public after vendor API freeze.\n\
                 To make these errors go away, you can guard types and attributes listed above,\n\
                 so they won't be included to the release build.\n\
                 \n\
                 See an example of how to guard them:\n    \
                 https://android-review.googlesource.com/3050544\n\
                 ******************************\n"
            )?;
        }
        Ok(())
    }
}
