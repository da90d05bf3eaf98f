//! Path-label mapping primitives.
//!
//! Everything here is pure: callers hand in text, get back typed entries, a
//! deterministic specificity order, and a prefix matcher that avoids compiling
//! regexes whenever the literal part of a pattern already decides the answer.

#![forbid(unsafe_code)]

mod entry;
mod error;
mod matcher;
mod meta;
mod property;
mod specificity;

pub use entry::{FileKind, ParseOutcome, PathRuleEntry, parse_file_contexts};
pub use error::ContextsError;
pub use matcher::{AnchoredPattern, matches_any_prefix, matches_prefix};
pub use meta::{META_CHARS, MetaCounts, is_meta, is_meta_char, pattern_len, stem_len};
pub use property::{PropertyContextEntry, parse_property_contexts};
pub use specificity::{Specificity, compare_specificity, sort_by_specificity};

#[cfg(test)]
mod proptest;
