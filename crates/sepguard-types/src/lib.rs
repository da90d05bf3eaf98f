//! Stable DTOs and IDs used across the sepguard workspace.
//!
//! This crate is intentionally boring:
//! - stable check IDs
//! - the fixed-arity security context label record
//! - the violation report handed back to callers

#![forbid(unsafe_code)]

pub mod context;
pub mod ids;
pub mod report;

pub use context::{ContextParseError, SecurityContext};
pub use report::{Report, Verdict, Violation};
