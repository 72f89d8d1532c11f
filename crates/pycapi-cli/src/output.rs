//! Output formatting for upgrade-pythoncapi
//!
//! Progress and warnings go to stderr, patched text and diffs to stdout.

use colored::*;
use std::io::{self, Write};
use std::path::Path;

use pycapi_core::compat::{COMPAT_HEADER, COMPAT_URL, INCLUDE_QUOTED};
use pycapi_rules::RuleRegistry;

/// Summary statistics
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub files_processed: usize,
    pub files_patched: usize,
    /// Files that gained the compat include
    pub compat_added: usize,
    /// Missing paths and directories without C files
    pub warnings: usize,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    quiet: bool,
    summary: Summary,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            summary: Summary::default(),
        }
    }

    /// Path-level warning; always shown, and makes the run fail
    pub fn warning(&mut self, message: &str) {
        self.summary.warnings += 1;
        eprintln!("{}: {}", "Warning".yellow(), message);
    }

    /// A file was processed; `applied` is empty when nothing changed
    pub fn report_file(&mut self, path: &Path, applied: &[&str], compat_added: bool) {
        self.summary.files_processed += 1;
        if compat_added {
            self.summary.compat_added += 1;
        }
        if applied.is_empty() {
            tracing::debug!(path = %path.display(), "no changes");
        } else {
            self.summary.files_patched += 1;
        }
    }

    /// A file was rewritten in place
    pub fn report_patched(&self, path: &Path, applied: &[&str]) {
        if !self.quiet {
            eprintln!("Patched file: {} ({})", path.display(), applied.join(", "));
        }
    }

    /// Print the closing notice about the compat header
    pub fn finish(&self) {
        if self.summary.compat_added == 0 || self.quiet {
            return;
        }
        eprintln!();
        eprintln!(
            "{} added: you may have to copy {} to your project",
            INCLUDE_QUOTED, COMPAT_HEADER
        );
        eprintln!("It can be copied from:");
        eprintln!("{}", COMPAT_URL);
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Write the list of operations shown under the usage text
pub fn write_operations(out: &mut impl Write, registry: &RuleRegistry) -> io::Result<()> {
    writeln!(out, "Operations:")?;
    writeln!(out)?;
    for (name, description) in registry.list_rules() {
        writeln!(out, "- {}: {}", name, description)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "If a directory is passed, search for .c and .h files in subdirectories."
    )
}

/// Write a unified diff (standard diff -u compatible)
pub fn write_unified_diff(
    out: &mut impl Write,
    path: &Path,
    old: &str,
    new: &str,
) -> io::Result<()> {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    writeln!(out, "--- a/{}", path_str)?;
    writeln!(out, "+++ b/{}", path_str)?;

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        writeln!(out, "{}", hunk.header())?;
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            write!(out, "{}{}", sign, change)?;
            if change.missing_newline() {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
