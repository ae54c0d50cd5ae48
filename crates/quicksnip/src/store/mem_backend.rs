use super::backend::{backup_path, BackupInfo, StorageBackend};
use crate::error::{QuicksnipError, Result};
use chrono::Utc;
use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

const LOCATION: &str = "memory://snippets.yaml";

/// In-memory storage backend for testing.
///
/// Locks are required (unlike a single-threaded cell) because the store is
/// shared with watcher and debounce threads.
#[derive(Default)]
pub struct MemBackend {
    document: Mutex<Option<String>>,
    /// Index 0 is backup slot 1 (newest).
    backups: Mutex<Vec<String>>,
    writes: Mutex<usize>,
    simulate_write_error: AtomicBool,
    simulate_read_error: AtomicBool,
    simulate_rotate_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose document already holds `text`.
    pub fn with_document(text: impl Into<String>) -> Self {
        let backend = Self::default();
        *backend.document.lock() = Some(text.into());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Enable read error simulation for testing error handling.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.store(simulate, Ordering::SeqCst);
    }

    /// Make backup rotation fail, as a full disk or a blocked backup slot would.
    pub fn set_simulate_rotate_error(&self, simulate: bool) {
        self.simulate_rotate_error.store(simulate, Ordering::SeqCst);
    }

    /// Test helper to overwrite the document as an external editor would.
    pub fn set_document(&self, text: impl Into<String>) {
        *self.document.lock() = Some(text.into());
    }

    pub fn document(&self) -> Option<String> {
        self.document.lock().clone()
    }

    pub fn push_backup(&self, text: impl Into<String>) {
        self.backups.lock().insert(0, text.into());
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl StorageBackend for MemBackend {
    fn read(&self) -> Result<Option<String>> {
        if self.simulate_read_error.load(Ordering::SeqCst) {
            return Err(QuicksnipError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Simulated read error",
            )));
        }
        Ok(self.document.lock().clone())
    }

    fn write(&self, text: &str) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(QuicksnipError::write_failure(
                &self.location(),
                io::Error::new(io::ErrorKind::Other, "Simulated write error"),
            ));
        }
        *self.document.lock() = Some(text.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }

    fn rotate_backups(&self, keep: usize) -> Result<()> {
        if self.simulate_rotate_error.load(Ordering::SeqCst) {
            return Err(QuicksnipError::Io(io::Error::new(
                io::ErrorKind::Other,
                "Simulated backup rotation error",
            )));
        }
        let Some(current) = self.document.lock().clone() else {
            return Ok(());
        };
        let mut backups = self.backups.lock();
        backups.insert(0, current);
        backups.truncate(keep);
        Ok(())
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        let location = self.location();
        let now = Utc::now();
        Ok((1..=self.backups.lock().len())
            .map(|index| BackupInfo {
                index,
                path: backup_path(&location, index),
                modified: Some(now),
            })
            .collect())
    }

    fn read_backup(&self, index: usize) -> Result<Option<String>> {
        if index == 0 {
            return Ok(None);
        }
        Ok(self.backups.lock().get(index - 1).cloned())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(LOCATION)
    }

    fn watch_path(&self) -> Option<PathBuf> {
        None
    }
}
