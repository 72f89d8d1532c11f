//! Apply a selection of rules to a source buffer

use pycapi_core::compat::{has_compat_include, insert_compat_include};
use pycapi_core::Rule;

use crate::RuleError;

/// Options for patching a buffer
#[derive(Debug, Clone, Copy)]
pub struct PatchOptions {
    /// Insert `#include "pythoncapi_compat.h"` when a fired rule needs it
    pub compat_include: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            compat_include: true,
        }
    }
}

/// Result of patching one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub text: String,
    /// Names of the rules that changed the text, in application order
    pub applied: Vec<&'static str>,
    /// Whether the compat include was inserted into this buffer
    pub compat_added: bool,
}

impl PatchOutcome {
    pub fn is_changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies the selected rules, in catalog order, to source buffers
pub struct Patcher<'r> {
    rules: Vec<&'r Rule>,
    options: PatchOptions,
}

impl<'r> Patcher<'r> {
    /// `rules` must already be in catalog order, as returned by
    /// [`RuleRegistry::select`](crate::RuleRegistry::select)
    pub fn new(rules: Vec<&'r Rule>, options: PatchOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &[&'r Rule] {
        &self.rules
    }

    /// Patch one buffer
    ///
    /// A rule that cannot be applied fails the whole buffer: no partially
    /// patched text is ever returned.
    pub fn patch(&self, text: &str) -> Result<PatchOutcome, RuleError> {
        let mut session = PatchSession::new(text, self.options);
        for rule in &self.rules {
            session.apply(rule)?;
        }
        Ok(session.finish())
    }
}

/// Per-buffer state, discarded once the buffer is patched
struct PatchSession {
    text: String,
    /// Insertion disabled, include already present, or inserted earlier
    compat_satisfied: bool,
    compat_added: bool,
    applied: Vec<&'static str>,
}

impl PatchSession {
    fn new(text: &str, options: PatchOptions) -> Self {
        Self {
            text: text.to_string(),
            compat_satisfied: !options.compat_include || has_compat_include(text),
            compat_added: false,
            applied: Vec::new(),
        }
    }

    fn apply(&mut self, rule: &Rule) -> Result<(), RuleError> {
        let rewritten = rule
            .rewrite(&self.text)
            .map_err(|source| RuleError::Rewrite {
                rule: rule.name(),
                source,
            })?;
        if rewritten == self.text {
            return Ok(());
        }

        tracing::debug!(rule = rule.name(), "rule fired");
        self.text = rewritten;
        self.applied.push(rule.name());

        if rule.needs_compat() && !self.compat_satisfied {
            self.text = insert_compat_include(&self.text);
            self.compat_satisfied = true;
            self.compat_added = true;
        }
        Ok(())
    }

    fn finish(self) -> PatchOutcome {
        PatchOutcome {
            text: self.text,
            applied: self.applied,
            compat_added: self.compat_added,
        }
    }
}
