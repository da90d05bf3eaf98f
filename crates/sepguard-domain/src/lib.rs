//! Pure conformance evaluation (no IO).
//!
//! Input: a loaded [`sepguard_policy::Policy`], optional compatibility inputs,
//! and an [`policy::EffectiveConfig`] resolved elsewhere.
//! Output: a [`sepguard_types::Report`].

#![forbid(unsafe_code)]

pub mod checks;
pub mod classifier;
pub mod context;
pub mod policy;

mod engine;
mod error;

pub use checks::{CATALOG, CheckSpec, Suite};
pub use classifier::{DomainClassifier, DomainRecord};
pub use context::{CheckContext, CompatInputs};
pub use engine::{evaluate, plan};
pub use error::EngineError;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod proptest;
