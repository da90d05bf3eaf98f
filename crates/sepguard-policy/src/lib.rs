//! The rule database.
//!
//! A [`Policy`] is built once from a [`PolicySource`] plus any number of
//! file_contexts texts. After that it is read-only: type/attribute resolution,
//! TE rule queries and the path/genfs label assertions never mutate it, apart
//! from the expanded rule set and compiled exact-match patterns, which are
//! filled in on first use.

#![forbid(unsafe_code)]

mod assertions;
mod error;
mod policy;
mod rule;
mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::PolicyError;
pub use policy::Policy;
pub use rule::{RuleFlavor, SELF_TARGET, TeQuery, TeRule};
pub use source::{GenfsEntry, PolicySource, TextPolicySource};

#[cfg(test)]
mod proptest;
