//! Rules: Fold object header assignments into setter macros
//!
//! Both `Py_TYPE(obj) = type;` and `obj->ob_type = type;` become
//! `Py_SET_TYPE(obj, type);`. Python 3.10 turned `Py_TYPE()`, `Py_SIZE()`
//! and `Py_REFCNT()` into functions that can no longer be assigned to, and
//! the setters only exist since Python 3.9, hence the compat header.
//!
//! These rules must run before the matching getter rules in `accessors`,
//! otherwise a getter could wrap the left side of what should become a
//! single setter call.

use pycapi_core::expr::member_access;
use pycapi_core::{Pattern, PatternError, Rule};

/// Right-hand side of a single assignment statement.
///
/// The first character may not be `=`: `Py_TYPE(x) == y` is a comparison.
pub(crate) const ASSIGNED_VALUE: &str = r"[^=;\s][^;]*?";

/// Match `Py_TYPE(expr) = value;`
fn call_assign(getter: &str) -> String {
    format!(r"\b{getter}\s*\(\s*(?P<expr>[^;=]+?)\s*\)\s*=\s*(?P<value>{ASSIGNED_VALUE})\s*;")
}

/// Match `expr->member = value;`
fn member_assign(member: &str) -> String {
    format!(
        r"{}\s*=\s*(?P<value>{ASSIGNED_VALUE})\s*;",
        member_access(member)
    )
}

fn setter(
    name: &'static str,
    description: &'static str,
    getter: &str,
    member: &str,
) -> Result<Rule, PatternError> {
    let template = format!("{name}(${{expr}}, ${{value}});");
    let patterns = vec![
        Pattern::new(&call_assign(getter), template.clone())?,
        Pattern::new(&member_assign(member), template)?,
    ];
    Ok(Rule::new(name, description, patterns).requires_compat())
}

pub fn py_set_type() -> Result<Rule, PatternError> {
    setter(
        "Py_SET_TYPE",
        "replace \"Py_TYPE(obj) = type;\" with \"Py_SET_TYPE(obj, type);\"",
        "Py_TYPE",
        "ob_type",
    )
}

pub fn py_set_size() -> Result<Rule, PatternError> {
    setter(
        "Py_SET_SIZE",
        "replace \"Py_SIZE(obj) = size;\" with \"Py_SET_SIZE(obj, size);\"",
        "Py_SIZE",
        "ob_size",
    )
}

pub fn py_set_refcnt() -> Result<Rule, PatternError> {
    setter(
        "Py_SET_REFCNT",
        "replace \"Py_REFCNT(obj) = refcnt;\" with \"Py_SET_REFCNT(obj, refcnt);\"",
        "Py_REFCNT",
        "ob_refcnt",
    )
}
