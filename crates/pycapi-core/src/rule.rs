//! Rule descriptor shared by every upgrade operation

use std::borrow::Cow;

use crate::{Pattern, PatternError};

/// A named upgrade operation
///
/// A rule holds an ordered list of patterns applied top to bottom, each on
/// the output of the previous one. Rules are built once when the catalog is
/// constructed and never change afterwards.
#[derive(Debug)]
pub struct Rule {
    name: &'static str,
    description: &'static str,
    patterns: Vec<Pattern>,
    needs_compat: bool,
    runs_after: &'static [&'static str],
}

impl Rule {
    pub fn new(name: &'static str, description: &'static str, patterns: Vec<Pattern>) -> Self {
        Self {
            name,
            description,
            patterns,
            needs_compat: false,
            runs_after: &[],
        }
    }

    /// Mark the rule as producing macros only `pythoncapi_compat.h` provides
    /// on older Python versions
    pub fn requires_compat(mut self) -> Self {
        self.needs_compat = true;
        self
    }

    /// Declare rules that must come earlier in the catalog
    pub fn runs_after(mut self, names: &'static [&'static str]) -> Self {
        self.runs_after = names;
        self
    }

    /// The unique identifier for this rule (e.g., "Py_SET_TYPE")
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A short description of what this rule does
    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn needs_compat(&self) -> bool {
        self.needs_compat
    }

    pub fn dependencies(&self) -> &'static [&'static str] {
        self.runs_after
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Run every pattern over the text in order
    ///
    /// Fails as a whole if any pattern fails, so a caller never sees a
    /// buffer where only part of the rule was applied.
    pub fn rewrite(&self, text: &str) -> Result<String, PatternError> {
        let mut current = text.to_string();
        for pattern in &self.patterns {
            if let Cow::Owned(next) = pattern.apply(&current)? {
                current = next;
            }
        }
        Ok(current)
    }
}
