//! Backup functionality for safe file modifications
//!
//! The original file is kept next to the patched one as `<file>.old`.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the file name of a backup
pub const BACKUP_SUFFIX: &str = ".old";

/// Writes patched files, keeping the original as a sibling backup
pub struct BackupManager {
    /// Whether backups are enabled
    enabled: bool,
}

impl BackupManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Where the backup of `path` goes: `mod.c` -> `mod.c.old`
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Replace the content of `path`, backing up the original first
    ///
    /// The original is renamed, never copied, so it is safe on disk before
    /// the first byte of new content is written. A stale backup is
    /// replaced. The new file gets the permissions of the original.
    pub fn write_file(&self, path: &Path, contents: &[u8]) -> Result<Option<PathBuf>> {
        if !self.enabled {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            return Ok(None);
        }

        let permissions = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?
            .permissions();

        let backup_path = Self::backup_path(path);
        fs::rename(path, &backup_path).with_context(|| {
            format!(
                "Failed to backup file: {} -> {}",
                path.display(),
                backup_path.display()
            )
        })?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions: {}", path.display()))?;

        Ok(Some(backup_path))
    }

    /// Check if backups are enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            BackupManager::backup_path(Path::new("src/mod.c")),
            PathBuf::from("src/mod.c.old")
        );
    }

    #[test]
    fn test_backup_disabled() {
        let temp = TempDir::new().unwrap();
        let manager = BackupManager::new(false);
        let test_file = temp.path().join("mod.c");
        fs::write(&test_file, "old").unwrap();

        assert!(!manager.is_enabled());
        assert!(manager.write_file(&test_file, b"new").unwrap().is_none());
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "new");
        assert!(!BackupManager::backup_path(&test_file).exists());
    }

    #[test]
    fn test_backup_file() {
        let temp = TempDir::new().unwrap();
        let manager = BackupManager::new(true);
        let test_file = temp.path().join("mod.c");
        fs::write(&test_file, "old").unwrap();

        let backup = manager.write_file(&test_file, b"new").unwrap().unwrap();

        assert_eq!(backup, temp.path().join("mod.c.old"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old");
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "new");
    }

    #[test]
    fn test_stale_backup_replaced() {
        let temp = TempDir::new().unwrap();
        let manager = BackupManager::new(true);
        let test_file = temp.path().join("mod.c");
        fs::write(&test_file, "second").unwrap();
        fs::write(BackupManager::backup_path(&test_file), "first").unwrap();

        let backup = manager.write_file(&test_file, b"third").unwrap().unwrap();

        assert_eq!(fs::read_to_string(&backup).unwrap(), "second");
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "third");
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_kept() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let manager = BackupManager::new(true);
        let test_file = temp.path().join("mod.c");
        fs::write(&test_file, "old").unwrap();
        fs::set_permissions(&test_file, fs::Permissions::from_mode(0o640)).unwrap();

        manager.write_file(&test_file, b"new").unwrap();

        let mode = fs::metadata(&test_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
