//! Rule registry: the ordered catalog of upgrade operations

use std::collections::HashSet;

use pycapi_core::{PatternError, Rule};
use thiserror::Error;

use crate::{accessors, allocators, identity, ownership, setters};

/// Errors raised while building the catalog, resolving a selection or
/// applying a rule
#[derive(Error, Debug)]
pub enum RuleError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("Duplicate rule name: {0}")]
    DuplicateName(&'static str),

    #[error("Rule {rule} runs after unknown rule {dependency}")]
    UnknownDependency {
        rule: &'static str,
        dependency: &'static str,
    },

    #[error("Rule {rule} must come after {dependency} in the catalog")]
    OutOfOrder {
        rule: &'static str,
        dependency: &'static str,
    },

    #[error("invalid operations: {}", .0.join(","))]
    InvalidOperations(Vec<String>),

    #[error("Rule {rule} could not be applied")]
    Rewrite {
        rule: &'static str,
        #[source]
        source: PatternError,
    },
}

/// Registry of all available upgrade operations
///
/// Catalog order is application order: a setter rule comes before the
/// getter reading the same field, and the ownership folds that build on
/// each other come last.
#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Result<Self, RuleError> {
        Self::from_rules(vec![
            setters::py_set_type()?,
            setters::py_set_size()?,
            setters::py_set_refcnt()?,
            accessors::py_type()?,
            accessors::py_size()?,
            accessors::py_refcnt()?,
            allocators::pyobject_new()?,
            allocators::pymem_malloc()?,
            allocators::pyobject_malloc()?,
            accessors::pyframe_getback()?,
            accessors::pyframe_getcode()?,
            accessors::pythreadstate_getinterpreter()?,
            accessors::pythreadstate_getframe()?,
            ownership::py_clear()?,
            ownership::py_newref()?,
            ownership::py_setref()?,
            identity::py_is()?,
        ])
    }

    /// Build a registry from an explicit catalog, checking its ordering
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(RuleError::DuplicateName(rule.name()));
            }
        }

        for (index, rule) in rules.iter().enumerate() {
            for &dependency in rule.dependencies() {
                let position = rules
                    .iter()
                    .position(|r| r.name() == dependency)
                    .ok_or(RuleError::UnknownDependency {
                        rule: rule.name(),
                        dependency,
                    })?;
                if position > index {
                    return Err(RuleError::OutOfOrder {
                        rule: rule.name(),
                        dependency,
                    });
                }
            }
        }

        Ok(Self { rules })
    }

    /// Get all rule names, in catalog order
    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }

    /// The whole catalog
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get all rules with their descriptions, sorted by name (for usage)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        let mut rules: Vec<_> = self
            .rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect();
        rules.sort_unstable_by_key(|(name, _)| *name);
        rules
    }

    /// Resolve a selection such as `"all,-Py_Is"` or `"Py_TYPE Py_SIZE"`
    ///
    /// Tokens are separated by commas and/or whitespace. `all` adds every
    /// rule, `-NAME` removes one, `NAME` adds one. The result follows
    /// catalog order whatever the order of the tokens. Unknown names still
    /// wanted once the whole spec is processed are reported together.
    pub fn select(&self, spec: &str) -> Result<Vec<&Rule>, RuleError> {
        let mut wanted: HashSet<String> = HashSet::new();
        for token in spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if token == "all" {
                wanted.extend(self.all_names().into_iter().map(String::from));
            } else if let Some(name) = token.strip_prefix('-') {
                wanted.remove(name);
            } else {
                wanted.insert(token.to_string());
            }
        }

        let selected: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| wanted.remove(r.name()))
            .collect();

        if !wanted.is_empty() {
            let mut unknown: Vec<String> = wanted.into_iter().collect();
            unknown.sort();
            return Err(RuleError::InvalidOperations(unknown));
        }

        Ok(selected)
    }
}
