//! Regex-based text substitution

use std::borrow::Cow;
use std::fmt;

use fancy_regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Backtracking budget for one substitution pass over a buffer.
///
/// The backtracking VM counts every start position it gives up on, so the
/// count grows with the size of the file, not only with the complexity of
/// the pattern. The default of one million is reached by C files of a few
/// thousand lines.
pub const BACKTRACK_LIMIT: usize = 1_000_000_000;

/// Errors that can occur while building or running a pattern
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    #[error("Pattern {pattern:?} failed while matching: {source}")]
    Matching {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// A compiled matcher paired with its rewrite template
///
/// Templates use `${name}` references to the named groups of the matcher.
/// A group that did not take part in the match expands to nothing.
pub struct Pattern {
    regex: Regex,
    template: String,
}

impl Pattern {
    /// Compile a new pattern
    pub fn new(pattern: &str, template: impl Into<String>) -> Result<Self, PatternError> {
        Self::with_backtrack_limit(pattern, template, BACKTRACK_LIMIT)
    }

    /// Compile a pattern with its own backtracking budget
    pub fn with_backtrack_limit(
        pattern: &str,
        template: impl Into<String>,
        limit: usize,
    ) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .backtrack_limit(limit)
            .build()
            .map_err(|e| PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            regex,
            template: template.into(),
        })
    }

    /// Replace every non-overlapping match in `text`
    ///
    /// Returns the borrowed input when nothing matched. Running out of
    /// backtracking budget is an error: the text is never half rewritten.
    pub fn apply<'t>(&self, text: &'t str) -> Result<Cow<'t, str>, PatternError> {
        self.regex
            .try_replacen(text, 0, self.template.as_str())
            .map_err(|e| PatternError::Matching {
                pattern: self.regex.as_str().to_string(),
                source: Box::new(e),
            })
    }

    /// Source of the compiled regex
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("regex", &self.regex.as_str())
            .field("template", &self.template)
            .finish()
    }
}
