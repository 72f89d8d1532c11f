//! Rules: Rename deprecated allocator macros
//!
//! The uppercase spellings are aliases kept for backward compatibility.
//! Only call sites are renamed: the old name must be followed by `(` on
//! the same line.

use pycapi_core::{Pattern, PatternError, Rule};

/// Uppercase spelling and its replacement, shared by `PyMem_` and `PyObject_`
const FAMILY: [(&str, &str); 5] = [
    ("MALLOC", "Malloc"),
    ("REALLOC", "Realloc"),
    ("FREE", "Free"),
    ("Del", "Free"),
    ("DEL", "Free"),
];

fn rename_call(old: &str, new: &str) -> Result<Pattern, PatternError> {
    Pattern::new(&format!(r"\b{old}\b(?P<call>[ \t]*\()"), format!("{new}${{call}}"))
}

fn allocator_family(prefix: &str) -> Result<Vec<Pattern>, PatternError> {
    FAMILY
        .iter()
        .map(|(old, new)| rename_call(&format!("{prefix}_{old}"), &format!("{prefix}_{new}")))
        .collect()
}

pub fn pyobject_new() -> Result<Rule, PatternError> {
    Ok(Rule::new(
        "PyObject_NEW",
        "replace \"PyObject_NEW(...)\" with \"PyObject_New(...)\", and \
         \"PyObject_NEW_VAR(...)\" with \"PyObject_NewVar(...)\"",
        vec![
            rename_call("PyObject_NEW", "PyObject_New")?,
            rename_call("PyObject_NEW_VAR", "PyObject_NewVar")?,
        ],
    ))
}

pub fn pymem_malloc() -> Result<Rule, PatternError> {
    Ok(Rule::new(
        "PyMem_MALLOC",
        "replace \"PyMem_MALLOC\" with \"PyMem_Malloc\", \"PyMem_REALLOC\" with \
         \"PyMem_Realloc\", and \"PyMem_FREE\", \"PyMem_Del\" and \"PyMem_DEL\" \
         with \"PyMem_Free\"",
        allocator_family("PyMem")?,
    ))
}

pub fn pyobject_malloc() -> Result<Rule, PatternError> {
    Ok(Rule::new(
        "PyObject_MALLOC",
        "replace \"PyObject_MALLOC\" with \"PyObject_Malloc\", \"PyObject_REALLOC\" \
         with \"PyObject_Realloc\", and \"PyObject_FREE\", \"PyObject_Del\" and \
         \"PyObject_DEL\" with \"PyObject_Free\"",
        allocator_family("PyObject")?,
    ))
}
