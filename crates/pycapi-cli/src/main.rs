//! upgrade-pythoncapi - upgrade C extensions to newer Python C API
//!
//! Rewrites C and C++ files in place (keeping `<file>.old` backups), or
//! prints the patched text or a diff. Run without arguments to list the
//! available operations.

mod backup;
mod config;
mod discover;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use backup::BackupManager;
use config::Config;
use discover::{discover, Discovered};
use output::{write_operations, write_unified_diff, Reporter};
use process::process_file;
use pycapi_rules::{PatchOptions, Patcher, RuleError, RuleRegistry};

#[derive(Parser)]
#[command(name = "upgrade-pythoncapi")]
#[command(version)]
#[command(about = "Upgrade C extension modules to newer Python C API")]
struct Cli {
    /// Files or directories to process
    #[arg(value_name = "FILE_OR_DIRECTORY")]
    paths: Vec<PathBuf>,

    /// Operations to apply, separated by commas or spaces (default: all).
    /// Prefix a name with '-' to exclude it.
    #[arg(long, short = 'o', value_name = "OPERATIONS")]
    operations: Option<String>,

    /// Quiet mode
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Write output into stdout instead of modifying files in-place (implies quiet mode)
    #[arg(long, short = 'c', conflicts_with = "diff")]
    to_stdout: bool,

    /// Print a unified diff instead of modifying files (implies quiet mode)
    #[arg(long)]
    diff: bool,

    /// Don't create .old backup files
    #[arg(long, short = 'B')]
    no_backup: bool,

    /// Don't add: #include "pythoncapi_compat.h"
    #[arg(long, short = 'C')]
    no_compat: bool,

    /// Path to config file (default: auto-detect .pythoncapi.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// Show debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Where patched text goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    InPlace,
    Stdout,
    Diff,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn print_usage(registry: &RuleRegistry) -> Result<()> {
    Cli::command().print_help()?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout)?;
    write_operations(&mut stdout, registry)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }
    if let Some(config_path) = &cli.config {
        tracing::debug!(path = %config_path.display(), "using config");
        return Config::load_path(config_path);
    }
    match Config::load()? {
        Some((config, path)) => {
            tracing::debug!(path = %path.display(), "using config");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = RuleRegistry::new()?;

    if cli.paths.is_empty() {
        print_usage(&registry)?;
        return Ok(ExitCode::from(1));
    }

    let config = load_config(&cli)?;

    let operations = config.effective_operations(cli.operations.as_deref());
    let rules = match registry.select(&operations) {
        Ok(rules) => rules,
        Err(e @ RuleError::InvalidOperations(_)) => {
            println!("{}", e);
            println!();
            print_usage(&registry)?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(
        "operations: {}",
        rules.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
    );

    let mode = if cli.to_stdout {
        Mode::Stdout
    } else if cli.diff {
        Mode::Diff
    } else {
        Mode::InPlace
    };
    let quiet = config.quiet(cli.quiet || mode != Mode::InPlace);
    let backups = BackupManager::new(config.backup(cli.no_backup));
    let patcher = Patcher::new(
        rules,
        PatchOptions {
            compat_include: config.compat(cli.no_compat),
        },
    );

    tracing::debug!(?mode, backups = backups.is_enabled(), "starting");

    let mut reporter = Reporter::new(quiet);

    for path in &cli.paths {
        match discover(path, &config) {
            Discovered::Files(files) => {
                for file in files {
                    patch_file(&file, &patcher, mode, &backups, &mut reporter)?;
                }
            }
            Discovered::NoSourceFiles => reporter.warning(&format!(
                "Directory {} doesn't contain any C file",
                path.display()
            )),
            Discovered::Missing => {
                reporter.warning(&format!("Path {} does not exist", path.display()))
            }
        }
    }

    reporter.finish();

    let summary = reporter.summary();
    tracing::debug!(
        processed = summary.files_processed,
        patched = summary.files_patched,
        "done"
    );

    Ok(if summary.warnings > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Patch one file and send the result where the mode says
fn patch_file(
    path: &Path,
    patcher: &Patcher<'_>,
    mode: Mode,
    backups: &BackupManager,
    reporter: &mut Reporter,
) -> Result<()> {
    let result = process_file(path, patcher)?;
    let applied = &result.outcome.applied;
    reporter.report_file(path, applied, result.outcome.compat_added);

    match mode {
        Mode::Stdout => {
            let contents = result
                .new_bytes()
                .with_context(|| format!("Failed to encode {}", path.display()))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&contents)?;
            stdout.flush()?;
        }
        Mode::Diff => {
            if result.is_changed() {
                let mut stdout = io::stdout().lock();
                write_unified_diff(&mut stdout, path, &result.old_source, &result.outcome.text)?;
            }
        }
        Mode::InPlace => {
            // Leave untouched files alone to keep their modification time
            if !result.is_changed() {
                return Ok(());
            }
            let contents = result
                .new_bytes()
                .with_context(|| format!("Failed to encode {}", path.display()))?;
            if let Some(backup) = backups.write_file(path, &contents)? {
                tracing::debug!(backup = %backup.display(), "original saved");
            }
            reporter.report_patched(path, applied);
        }
    }

    Ok(())
}
