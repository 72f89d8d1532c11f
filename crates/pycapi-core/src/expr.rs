//! Textual grammar of a C expression that reads a struct member
//!
//! Every member-access rule is built from these fragments so that what
//! counts as "an expression" stays identical across the whole catalog.
//! This is pattern matching on raw text, not a C parser: well-formed,
//! conventionally formatted code is assumed.

/// A C identifier: `obj`, `var_3`, `NameCamelCase`
pub const IDENT: &str = r"[a-zA-Z][a-zA-Z0-9_]*";

/// Placed in front of an expression so a match cannot begin in the middle
/// of an identifier or halfway down a member chain (`f()->a->b` must not
/// yield `a` as a base expression).
pub const EXPR_START: &str = r"(?<![A-Za-z0-9_.])(?<!->)";

/// An identifier with optional index suffixes: `array`, `array[3]`, `m[i][j]`
pub fn subexpr() -> String {
    format!(r"{IDENT}(?:\[[^\]\n]+\])*")
}

/// A member chain: `frame`, `frame.attr`, `obj->attr`, `a->b.c[2]->d`.
///
/// Function calls are never matched: an expression directly followed by
/// `(` is rejected, so `func()->ob_type` has no base expression.
pub fn expr() -> String {
    let sub = subexpr();
    format!(r"{sub}(?:\s*(?:->|\.)\s*{sub})*(?!\s*\()")
}

/// [`expr`] with optional leading dereferences: `*obj`, `**slot`
pub fn deref_expr() -> String {
    format!(r"\**{}", expr())
}

/// `EXPR->member`, capturing `EXPR` as the named group `expr`
pub fn member_access(member: &str) -> String {
    format!(r"{EXPR_START}(?P<expr>{})\s*->\s*{member}\b", expr())
}
