use super::backend::{backup_index, backup_path, BackupInfo, StorageBackend};
use crate::error::{QuicksnipError, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Directory holding `path`, `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replaces `path` with `text` via a sibling tmp file and a rename, so readers
/// see either the old or the new file, never a partial one.
pub(crate) fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let dir = parent_dir(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| QuicksnipError::write_failure(path, e))?;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));

    let written = fs::write(&tmp_path, text).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(QuicksnipError::write_failure(path, e));
    }
    Ok(())
}

/// Snippet document stored as a single file, with backups next to it.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        parent_dir(&self.path)
    }

    fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuicksnipError::Io(e)),
        }
    }

    fn mtime(path: &Path) -> Option<DateTime<Utc>> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}

impl StorageBackend for FsBackend {
    fn read(&self) -> Result<Option<String>> {
        Self::read_optional(&self.path)
    }

    fn write(&self, text: &str) -> Result<()> {
        write_atomic(&self.path, text)?;
        debug!(path = %self.path.display(), bytes = text.len(), "snippet file written");
        Ok(())
    }

    fn rotate_backups(&self, keep: usize) -> Result<()> {
        if keep == 0 || !self.path.exists() {
            return Ok(());
        }

        // Anything at or beyond the last slot is evicted.
        for backup in self.list_backups()? {
            if backup.index >= keep {
                fs::remove_file(&backup.path)?;
            }
        }

        for index in (1..keep).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }

        fs::copy(&self.path, backup_path(&self.path, 1))?;
        Ok(())
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        let dir = self.dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(index) = backup_index(&self.path, &path) {
                backups.push(BackupInfo {
                    index,
                    modified: Self::mtime(&path),
                    path,
                });
            }
        }
        backups.sort_by_key(|b| b.index);
        Ok(backups)
    }

    fn read_backup(&self, index: usize) -> Result<Option<String>> {
        Self::read_optional(&backup_path(&self.path, index))
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn watch_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}
