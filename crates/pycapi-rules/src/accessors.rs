//! Rules: Replace direct struct member reads with accessor calls
//!
//! `obj->ob_type` becomes `Py_TYPE(obj)`, `frame->f_back` becomes
//! `_PyFrame_GetBackBorrow(frame)`, and so on. Only reads are rewritten:
//! a member access that is the target of an assignment, a compound
//! assignment or an increment is left alone (the setter rules fold the
//! plain assignments beforehand).

use pycapi_core::expr::member_access;
use pycapi_core::{Pattern, PatternError, Rule};

/// The member is not written to: `=`, `+=`, `<<=`, `++`, `--`, but `==` is fine.
const NOT_WRITTEN: &str = r"(?!\s*(?:[-+*/%&|^]|<<|>>)?=(?!=))(?!\s*(?:\+\+|--))";

/// The member is not the slot argument of a macro taking ownership of it.
const NOT_A_SLOT: &str = r"(?<!Py_CLEAR\()(?<!Py_SETREF\()(?<!Py_XSETREF\()";

fn member_read(member: &str) -> String {
    format!("{NOT_A_SLOT}{}{NOT_WRITTEN}", member_access(member))
}

fn accessor(
    name: &'static str,
    description: &'static str,
    member: &str,
    function: &str,
) -> Result<Rule, PatternError> {
    let pattern = Pattern::new(&member_read(member), format!("{function}(${{expr}})"))?;
    Ok(Rule::new(name, description, vec![pattern]))
}

pub fn py_type() -> Result<Rule, PatternError> {
    Ok(accessor(
        "Py_TYPE",
        "replace \"op->ob_type\" with \"Py_TYPE(op)\"",
        "ob_type",
        "Py_TYPE",
    )?
    .runs_after(&["Py_SET_TYPE"]))
}

pub fn py_size() -> Result<Rule, PatternError> {
    Ok(accessor(
        "Py_SIZE",
        "replace \"op->ob_size\" with \"Py_SIZE(op)\"",
        "ob_size",
        "Py_SIZE",
    )?
    .runs_after(&["Py_SET_SIZE"]))
}

pub fn py_refcnt() -> Result<Rule, PatternError> {
    Ok(accessor(
        "Py_REFCNT",
        "replace \"op->ob_refcnt\" with \"Py_REFCNT(op)\"",
        "ob_refcnt",
        "Py_REFCNT",
    )?
    .runs_after(&["Py_SET_REFCNT"]))
}

pub fn pyframe_getback() -> Result<Rule, PatternError> {
    Ok(accessor(
        "PyFrame_GetBack",
        "replace \"frame->f_back\" with \"_PyFrame_GetBackBorrow(frame)\"",
        "f_back",
        "_PyFrame_GetBackBorrow",
    )?
    .requires_compat())
}

pub fn pyframe_getcode() -> Result<Rule, PatternError> {
    Ok(accessor(
        "PyFrame_GetCode",
        "replace \"frame->f_code\" with \"_PyFrame_GetCodeBorrow(frame)\"",
        "f_code",
        "_PyFrame_GetCodeBorrow",
    )?
    .requires_compat())
}

pub fn pythreadstate_getinterpreter() -> Result<Rule, PatternError> {
    Ok(accessor(
        "PyThreadState_GetInterpreter",
        "replace \"tstate->interp\" with \"PyThreadState_GetInterpreter(tstate)\"",
        "interp",
        "PyThreadState_GetInterpreter",
    )?
    .requires_compat())
}

pub fn pythreadstate_getframe() -> Result<Rule, PatternError> {
    Ok(accessor(
        "PyThreadState_GetFrame",
        "replace \"tstate->frame\" with \"_PyThreadState_GetFrameBorrow(tstate)\"",
        "frame",
        "_PyThreadState_GetFrameBorrow",
    )?
    .requires_compat())
}
