//! Input path discovery

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;

/// Extensions of the C and C++ files worth patching
pub const C_EXTENSIONS: &[&str] = &["c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx"];

/// Tool cache directories never walked into
const SKIPPED_DIRS: &[&str] = &[".tox"];

/// What a command line path resolved to
#[derive(Debug, PartialEq, Eq)]
pub enum Discovered {
    /// Files to patch, in walk order
    Files(Vec<PathBuf>),
    /// A directory holding no C file at all
    NoSourceFiles,
    Missing,
}

pub fn is_c_filename(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| C_EXTENSIONS.contains(&ext))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Resolve one command line path
///
/// A file is used as given, whatever its extension. A directory is walked
/// recursively for C files; files matching an exclude pattern are dropped
/// but still count as found.
pub fn discover(path: &Path, config: &Config) -> Discovered {
    if path.is_dir() {
        let mut found = false;
        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!("skipping unreadable entry: {}", err);
                    None
                }
            })
            // Symlinked files count, symlinked directories are not entered
            .filter(|e| e.path().is_file() && is_c_filename(e.path()))
        {
            found = true;
            if config.should_exclude(entry.path()) {
                tracing::debug!(path = %entry.path().display(), "excluded by config");
                continue;
            }
            files.push(entry.into_path());
        }

        if found {
            Discovered::Files(files)
        } else {
            Discovered::NoSourceFiles
        }
    } else if path.exists() {
        Discovered::Files(vec![path.to_path_buf()])
    } else {
        Discovered::Missing
    }
}
