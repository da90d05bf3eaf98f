use crate::entry::PathRuleEntry;
use std::cmp::Ordering;

/// Sort key for path rules, least specific first.
///
/// Field order is the tie-break order: literal beats regex, then the longer
/// literal stem, then the longer unescaped pattern, then an explicit file kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    literal: bool,
    stem_len: usize,
    pattern_len: usize,
    has_file_kind: bool,
}

impl PathRuleEntry {
    pub fn specificity(&self) -> Specificity {
        Specificity {
            literal: !self.is_meta,
            stem_len: self.stem_len,
            pattern_len: self.pattern_len,
            has_file_kind: self.file_kind.is_some(),
        }
    }
}

/// `Greater` means `a` is more specific than `b`; `Equal` is a true tie.
pub fn compare_specificity(a: &PathRuleEntry, b: &PathRuleEntry) -> Ordering {
    a.specificity().cmp(&b.specificity())
}

/// Stable sort from least to most specific.
pub fn sort_by_specificity(entries: &mut [PathRuleEntry]) {
    entries.sort_by_key(PathRuleEntry::specificity);
}
