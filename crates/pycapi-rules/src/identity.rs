//! Rule: Replace comparisons against singletons with `Py_Is*()` predicates

use pycapi_core::expr::deref_expr;
use pycapi_core::{Pattern, PatternError, Rule};

const SINGLETONS: [(&str, &str); 3] = [
    ("Py_None", "Py_IsNone"),
    ("Py_True", "Py_IsTrue"),
    ("Py_False", "Py_IsFalse"),
];

/// The left operand must start a (sub)expression: not in the middle of an
/// identifier or member chain, and not right after a cast, a subscript or
/// a logical negation.
const OPERAND_START: &str = r"(?<![A-Za-z0-9_.)\]!])(?<!->)";

pub fn py_is() -> Result<Rule, PatternError> {
    let operand = format!(r"{OPERAND_START}(?P<expr>{})", deref_expr());
    let mut patterns = Vec::with_capacity(SINGLETONS.len() * 2);
    for (singleton, predicate) in SINGLETONS {
        patterns.push(Pattern::new(
            &format!(r"{operand}\s*==\s*{singleton}\b"),
            format!("{predicate}(${{expr}})"),
        )?);
        patterns.push(Pattern::new(
            &format!(r"{operand}\s*!=\s*{singleton}\b"),
            format!("!{predicate}(${{expr}})"),
        )?);
    }

    Ok(Rule::new(
        "Py_Is",
        "replace \"x == Py_None\" with \"Py_IsNone(x)\", and similar for Py_True and Py_False",
        patterns,
    )
    .requires_compat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality() {
        let rule = py_is().unwrap();
        assert_eq!(rule.rewrite("if (x == Py_None) {}").unwrap(), "if (Py_IsNone(x)) {}");
        assert_eq!(rule.rewrite("ok = (x == Py_True);").unwrap(), "ok = (Py_IsTrue(x));");
        assert_eq!(rule.rewrite("return x==Py_False;").unwrap(), "return Py_IsFalse(x);");
    }

    #[test]
    fn test_inequality() {
        let rule = py_is().unwrap();
        assert_eq!(rule.rewrite("if (x != Py_None) {}").unwrap(), "if (!Py_IsNone(x)) {}");
    }

    #[test]
    fn test_member_chain_and_deref() {
        let rule = py_is().unwrap();
        assert_eq!(
            rule.rewrite("if (self->attr == Py_None) {}").unwrap(),
            "if (Py_IsNone(self->attr)) {}"
        );
        assert_eq!(rule.rewrite("if (*slot == Py_None) {}").unwrap(), "if (Py_IsNone(*slot)) {}");
    }

    #[test]
    fn test_skip_casts_and_calls() {
        let rule = py_is().unwrap();
        for source in [
            "if ((PyObject *)x == Py_None) {}",
            "if (func() == Py_None) {}",
            "if (!x == Py_None) {}",
        ] {
            assert_eq!(rule.rewrite(source).unwrap(), source);
        }
    }

    #[test]
    fn test_whole_singleton_name() {
        let rule = py_is().unwrap();
        let source = "if (x == Py_NoneStruct) {}";
        assert_eq!(rule.rewrite(source).unwrap(), source);
    }
}
