//! Configuration file support for upgrade-pythoncapi
//!
//! Loads `.pythoncapi.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file searched for
pub const CONFIG_FILE: &str = ".pythoncapi.toml";

/// Selection used when neither the command line nor the file gives one
pub const DEFAULT_OPERATIONS: &str = "all";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Selection spec, same syntax as `--operations`
    pub operations: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from directory walks
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub quiet: Option<bool>,
    /// Keep `<file>.old` backups (default true)
    pub backup: Option<bool>,
    /// Insert the compat include when needed (default true)
    pub compat: Option<bool>,
}

impl Config {
    /// Load config from `.pythoncapi.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Selection spec to resolve: the command line wins over the file
    pub fn effective_operations(&self, cli_operations: Option<&str>) -> String {
        cli_operations
            .or(self.rules.operations.as_deref())
            .unwrap_or(DEFAULT_OPERATIONS)
            .to_string()
    }

    /// Flags given on the command line can only switch these on
    pub fn quiet(&self, cli_quiet: bool) -> bool {
        cli_quiet || self.output.quiet.unwrap_or(false)
    }

    pub fn backup(&self, cli_no_backup: bool) -> bool {
        !cli_no_backup && self.output.backup.unwrap_or(true)
    }

    pub fn compat(&self, cli_no_compat: bool) -> bool {
        !cli_no_compat && self.output.compat.unwrap_or(true)
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                // Also try matching against just the file name
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
