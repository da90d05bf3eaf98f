//! Compatibility mapping support.
//!
//! Only the handful of CIL statements that carry type and attribute
//! declarations are interpreted; everything else is skipped with a warning.

#![forbid(unsafe_code)]

mod error;
mod freeze;
mod mapping;
mod sexpr;

pub use error::CompatError;
pub use freeze::FreezeDiff;
pub use mapping::CilPolicy;
pub use sexpr::{Sexpr, parse_sexprs};
