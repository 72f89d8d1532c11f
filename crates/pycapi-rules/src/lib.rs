//! pycapi-rules: The upgrade rule catalog
//!
//! Rule families:
//! - setters: Fold `Py_TYPE(obj) = type;` and `obj->ob_type = type;` into `Py_SET_TYPE()`
//! - accessors: Replace member reads such as `obj->ob_type` with accessor calls
//! - allocators: Normalize legacy `PyMem_MALLOC()` style spellings
//! - ownership: Fold reference counting idioms into `Py_NewRef()`, `Py_SETREF()`, `Py_CLEAR()`
//! - identity: Replace `x == Py_None` with `Py_IsNone(x)`
//!
//! `RuleRegistry` holds the catalog in its load-bearing order and resolves
//! selection specs; `Patcher` applies a selection to a text buffer.

pub mod accessors;
pub mod allocators;
pub mod identity;
pub mod ownership;
mod patcher;
mod registry;
pub mod setters;

pub use patcher::{PatchOptions, PatchOutcome, Patcher};
pub use registry::{RuleError, RuleRegistry};
