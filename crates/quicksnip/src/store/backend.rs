use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One retained copy of an earlier snippet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    /// 1 is the newest.
    pub index: usize,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

/// Abstract interface for raw snippet-file I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while SnippetStore handles the "what" (parsing, validation, notification).
///
/// Implementations are shared between caller threads and the watcher thread,
/// hence `Send + Sync`.
pub trait StorageBackend: Send + Sync {
    // --- Document ---

    /// Read the raw snippet document.
    /// Returns Ok(None) if the file does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self) -> Result<Option<String>>;

    /// Replace the document.
    /// MUST be atomic (write to tmp then rename) so no reader sees a partial file.
    /// Failures are reported as `WriteFailure`.
    fn write(&self, text: &str) -> Result<()>;

    // --- Backups ---

    /// Copy the current document into backup slot 1, shifting older copies up
    /// and discarding anything beyond `keep`. No-op when there is no document.
    fn rotate_backups(&self, keep: usize) -> Result<()>;

    /// Existing backups, newest (index 1) first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>>;

    /// Ok(None) if there is no backup at `index`.
    fn read_backup(&self, index: usize) -> Result<Option<String>>;

    // --- Paths & Capabilities ---

    /// The document path. For MemBackend, a virtual path.
    fn location(&self) -> PathBuf;

    /// Real file to watch for external edits, if the backend has one.
    fn watch_path(&self) -> Option<PathBuf>;
}

/// Lets several owners share one backend (tests keep a handle to inspect it).
impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, text: &str) -> Result<()> {
        (**self).write(text)
    }

    fn rotate_backups(&self, keep: usize) -> Result<()> {
        (**self).rotate_backups(keep)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        (**self).list_backups()
    }

    fn read_backup(&self, index: usize) -> Result<Option<String>> {
        (**self).read_backup(index)
    }

    fn location(&self) -> PathBuf {
        (**self).location()
    }

    fn watch_path(&self) -> Option<PathBuf> {
        (**self).watch_path()
    }
}

/// `<file>.backup.001`, `<file>.backup.002`, ...
pub fn backup_path(file: &Path, index: usize) -> PathBuf {
    let mut name = file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".backup.{:03}", index));
    file.with_file_name(name)
}

/// Inverse of [`backup_path`]: the slot index if `candidate` is a backup of `file`.
pub fn backup_index(file: &Path, candidate: &Path) -> Option<usize> {
    let base = file.file_name()?.to_str()?;
    let name = candidate.file_name()?.to_str()?;
    let suffix = name.strip_prefix(base)?.strip_prefix(".backup.")?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok().filter(|&i| i > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path_is_zero_padded() {
        let file = Path::new("/data/snippets.yaml");
        assert_eq!(
            backup_path(file, 1),
            PathBuf::from("/data/snippets.yaml.backup.001")
        );
        assert_eq!(
            backup_path(file, 12),
            PathBuf::from("/data/snippets.yaml.backup.012")
        );
    }

    #[test]
    fn test_backup_index_roundtrip() {
        let file = Path::new("/data/snippets.yaml");
        assert_eq!(backup_index(file, &backup_path(file, 7)), Some(7));
    }

    #[test]
    fn test_backup_index_rejects_other_files() {
        let file = Path::new("/data/snippets.yaml");
        assert_eq!(backup_index(file, Path::new("/data/snippets.yaml")), None);
        assert_eq!(backup_index(file, Path::new("/data/usage.yaml.backup.001")), None);
        assert_eq!(backup_index(file, Path::new("/data/snippets.yaml.backup.")), None);
        assert_eq!(backup_index(file, Path::new("/data/snippets.yaml.backup.x1")), None);
        assert_eq!(backup_index(file, Path::new("/data/snippets.yaml.backup.000")), None);
    }
}
