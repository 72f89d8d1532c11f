//! Rules: Condense reference counting idioms into ownership-aware calls
//!
//! Every fold here works on *adjacent statements*, either sharing one line
//! (the first statement opening the line or following `{` or `;`) or on
//! consecutive lines with exactly the same indentation. A statement indented
//! differently from its neighbour lives in another block, typically the body
//! of an unbraced `if`, and is never folded. Neither is a run whose first
//! line directly follows a bare `if (...)`, `for (...)`, `while (...)`,
//! `else` or `do` header: that line is the body of the header even when it
//! is indented like the next one.

use pycapi_core::expr::{deref_expr, IDENT};
use pycapi_core::{Pattern, PatternError, Rule};

use crate::setters::ASSIGNED_VALUE;

/// Increment macro and the new-reference function it folds into
const INCREFS: [(&str, &str); 2] = [("Py_INCREF", "Py_NewRef"), ("Py_XINCREF", "Py_XNewRef")];

/// Decrement of the old value and the replace call it folds into
const DECREFS: [(&str, &str); 3] = [
    ("Py_DECREF", "Py_SETREF"),
    ("Py_XDECREF", "Py_XSETREF"),
    ("Py_CLEAR", "Py_XSETREF"),
];

/// `(PyObject *)`, dropped since new-reference calls already return `PyObject *`
const PYOBJECT_CAST: &str = r"\(\s*PyObject\s*\*\s*\)\s*";

/// `(Type *)` or `(struct type *)`
fn pointer_cast() -> String {
    format!(r"\(\s*(?:struct\s+)?{IDENT}\s*\*\s*\)\s*")
}

/// Optional cast in front of the assigned variable. Any cast other than
/// `(PyObject *)` is captured as `cast` and kept in front of the new call.
fn value_cast() -> String {
    format!(r"(?:{PYOBJECT_CAST}|(?P<cast>{}))?", pointer_cast())
}

/// Left side of an assignment, optionally declaring it: `obj->attr`, `*slot`,
/// `PyObject *copy`. The whole target is captured as `target`, the assigned
/// expression alone as `lvalue`.
fn assign_target() -> String {
    format!(
        r"(?P<target>(?:{IDENT}\s*\*+\s*)?(?P<lvalue>{}))",
        deref_expr()
    )
}

/// Line endings of a control statement whose body is the next line.
/// Lookbehinds must have a fixed size, hence one per trailing blank count.
fn after_control_header() -> String {
    let mut guard = String::new();
    for header in [r"\)", r"[^A-Za-z0-9_]else", r"[^A-Za-z0-9_]do"] {
        for blanks in ["", r"[ \t]", r"[ \t]{2}"] {
            for eol in [r"\n", r"\r\n"] {
                guard.push_str(&format!("(?<!{header}{blanks}{eol})"));
            }
        }
    }
    guard
}

/// Build the two patterns replacing a run of adjacent statements.
///
/// Statements may refer back to groups captured by earlier ones. The
/// indentation (or the `{`/`;` preceding a same-line run) is kept in front
/// of the replacement.
fn adjacent(statements: &[String], replacement: &str) -> Result<Vec<Pattern>, PatternError> {
    let guard = after_control_header();
    let multi_line = format!(
        r"(?m)^{guard}(?P<indent>[ \t]*){}",
        statements.join(r"[ \t]*\r?\n\k<indent>")
    );
    let same_line = format!(
        r"(?m)(?P<lead>^{guard}[ \t]*|[{{;][ \t]*){}",
        statements.join(r"[ \t]*")
    );
    Ok(vec![
        Pattern::new(&multi_line, format!("${{indent}}{replacement}"))?,
        Pattern::new(&same_line, format!("${{lead}}{replacement}"))?,
    ])
}

fn call_statement(function: &str, group: &str, argument: &str) -> String {
    format!(r"\b{function}\(\s*(?P<{group}>{argument})\s*\);")
}

/// `Py_XDECREF(slot); slot = NULL;` becomes `Py_CLEAR(slot);`
///
/// A plain `Py_DECREF()` followed by `= NULL` is left alone: `Py_CLEAR()`
/// accepts NULL where the original code did not, so the fold would hide a
/// behaviour change.
pub fn py_clear() -> Result<Rule, PatternError> {
    let statements = [
        call_statement("Py_XDECREF", "slot", &deref_expr()),
        r"\k<slot>\s*=\s*NULL\s*;".to_string(),
    ];
    Ok(Rule::new(
        "Py_CLEAR",
        "replace \"Py_XDECREF(var); var = NULL;\" with \"Py_CLEAR(var);\"",
        adjacent(&statements, "Py_CLEAR(${slot});")?,
    ))
}

/// Fold an increment into the statement returning or storing the object.
///
/// Three shapes per increment macro, in this order:
/// `Py_INCREF(x); return x;`, `Py_INCREF(x); y = x;` and `y = x; Py_INCREF(x);`
/// (the last one also accepts `Py_INCREF(y)`). Trying increment-first before
/// assignment-first makes a chain of pairs fold the same way every time.
pub fn py_newref() -> Result<Rule, PatternError> {
    let cast = value_cast();
    let target = assign_target();
    let mut patterns = Vec::new();

    for (incref, newref) in INCREFS {
        let increment = call_statement(incref, "var", IDENT);
        let stored = format!("${{target}}${{eq}}${{cast}}{newref}(${{var}});");

        patterns.extend(adjacent(
            &[increment.clone(), format!(r"return\s+{cast}\k<var>\s*;")],
            &format!("return ${{cast}}{newref}(${{var}});"),
        )?);
        patterns.extend(adjacent(
            &[
                increment,
                format!(r"{target}(?P<eq>\s*=\s*){cast}\k<var>\s*;"),
            ],
            &stored,
        )?);
        patterns.extend(adjacent(
            &[
                format!(r"{target}(?P<eq>\s*=\s*){cast}(?P<var>(?!NULL\b){IDENT})\s*;"),
                format!(r"\b{incref}\(\s*(?:\k<var>|\k<lvalue>)\s*\);"),
            ],
            &stored,
        )?);
    }

    Ok(Rule::new(
        "Py_NewRef",
        "replace \"Py_INCREF(obj); return obj;\" with \"return Py_NewRef(obj);\", \
         and \"Py_INCREF(obj); var = obj;\" with \"var = Py_NewRef(obj);\"",
        patterns,
    )
    .requires_compat())
}

/// Fold the release of a slot's old value and the store of a new one.
///
/// Covered shapes, `DEC` being any of [`DECREFS`]:
/// - `Py_INCREF(new); DEC(slot); slot = new;` in either order of the first two
/// - `DEC(slot); slot = value;`
/// - `old = slot; slot = value; Py_DECREF(old);`
///
/// Storing NULL is never folded: that is the job of `Py_CLEAR`.
pub fn py_setref() -> Result<Rule, PatternError> {
    let slot = deref_expr();
    let assign_value =
        format!(r"\k<slot>\s*=\s*(?P<value>(?!NULL\s*;){ASSIGNED_VALUE})\s*;");
    let mut patterns = Vec::new();

    for (decref, setref) in DECREFS {
        let decrement = call_statement(decref, "slot", &slot);
        for (incref, newref) in INCREFS {
            let increment = call_statement(incref, "var", IDENT);
            let assign_var = format!(r"\k<slot>\s*=\s*(?:{PYOBJECT_CAST})?\k<var>\s*;");
            let replacement = format!("{setref}(${{slot}}, {newref}(${{var}}));");

            patterns.extend(adjacent(
                &[increment.clone(), decrement.clone(), assign_var.clone()],
                &replacement,
            )?);
            patterns.extend(adjacent(
                &[decrement.clone(), increment, assign_var],
                &replacement,
            )?);
        }
    }

    for (decref, setref) in DECREFS {
        patterns.extend(adjacent(
            &[call_statement(decref, "slot", &slot), assign_value.clone()],
            &format!("{setref}(${{slot}}, ${{value}});"),
        )?);
    }

    let save_old = format!(
        r"(?:{IDENT}\s*\*+\s*)?(?P<old>{IDENT})\s*=\s*(?:{})?(?P<slot>{slot})\s*;",
        pointer_cast()
    );
    for (decref, setref) in &DECREFS[..2] {
        patterns.extend(adjacent(
            &[
                save_old.clone(),
                assign_value.clone(),
                format!(r"\b{decref}\(\s*\k<old>\s*\);"),
            ],
            &format!("{setref}(${{slot}}, ${{value}});"),
        )?);
    }

    Ok(Rule::new(
        "Py_SETREF",
        "replace \"Py_DECREF(obj); obj = new;\" with \"Py_SETREF(obj, new);\", \
         and \"Py_XDECREF(obj); obj = new;\" with \"Py_XSETREF(obj, new);\"",
        patterns,
    )
    .requires_compat()
    .runs_after(&["Py_CLEAR", "Py_NewRef"]))
}
