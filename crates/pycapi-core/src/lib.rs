//! pycapi-core: Core abstractions for rewriting Python C API code
//!
//! This crate provides:
//! - `expr`: The textual grammar of a C member-access expression
//! - `Pattern`: A compiled (regex, template) substitution
//! - `Rule`: A named, ordered group of patterns
//! - `compat`: Names and helpers for the `pythoncapi_compat.h` include

pub mod compat;
pub mod expr;
mod pattern;
mod rule;

pub use pattern::{Pattern, PatternError};
pub use rule::Rule;
