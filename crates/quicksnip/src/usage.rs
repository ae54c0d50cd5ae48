//! # Usage Tracking
//!
//! Counts how often each snippet was delivered so search can rank frequently
//! used snippets first.
//!
//! ## Consistency Model
//!
//! - [`UsageTracker::increment`] updates memory synchronously; a following
//!   [`UsageTracker::get_count`] sees the new value at once.
//! - Disk writes are batched: an increment marks the counters dirty and
//!   triggers a [`Debouncer`]. When the window passes without further use,
//!   the counters are written once.
//! - [`UsageTracker::flush`] writes immediately if anything is pending. The
//!   host calls it on shutdown; dropping the tracker also tries.
//!
//! ## File Format
//!
//! ```yaml
//! snippet_usage:
//!   flask-run: 12
//!   git-uncommit: 3
//! ```
//!
//! A missing or unreadable file starts with no counts. Entries whose count is
//! not a non-negative integer are skipped.
//!
//! The tracker never looks at the snippet collection. Counters for deleted
//! snippets stay until [`UsageTracker::cleanup_orphaned`] is called with the
//! ids that still exist.

use crate::debounce::Debouncer;
use crate::error::{QuicksnipError, Result};
use crate::store::fs_backend::write_atomic;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Read access to usage counts, as the search engine needs it.
pub trait UsageLookup {
    /// 0 for ids without a record.
    fn count(&self, id: &str) -> u64;
}

impl UsageLookup for HashMap<String, u64> {
    fn count(&self, id: &str) -> u64 {
        self.get(id).copied().unwrap_or(0)
    }
}

impl UsageLookup for BTreeMap<String, u64> {
    fn count(&self, id: &str) -> u64 {
        self.get(id).copied().unwrap_or(0)
    }
}

#[derive(Deserialize)]
struct UsageFileIn {
    #[serde(default)]
    snippet_usage: Option<BTreeMap<String, serde_yaml::Value>>,
}

#[derive(Serialize)]
struct UsageFileOut<'a> {
    snippet_usage: &'a BTreeMap<String, u64>,
}

struct Inner {
    path: PathBuf,
    counts: Mutex<HashMap<String, u64>>,
    dirty: AtomicBool,
    /// Serializes flushes from the debounce thread and callers.
    write_lock: Mutex<()>,
}

impl Inner {
    fn flush(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let counts: BTreeMap<String, u64> = self
            .counts
            .lock()
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();

        let written = serde_yaml::to_string(&UsageFileOut {
            snippet_usage: &counts,
        })
        .map_err(QuicksnipError::from)
        .and_then(|text| write_atomic(&self.path, &text));

        match written {
            Ok(()) => {
                debug!(path = %self.path.display(), entries = counts.len(), "usage counts written");
                Ok(())
            }
            Err(e) => {
                // Keep the data pending so a later flush can retry.
                self.dirty.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }
}

pub struct UsageTracker {
    inner: Arc<Inner>,
    debouncer: Debouncer,
}

impl UsageTracker {
    /// Opens the counter file at `path`; disk writes are coalesced over `flush_window`.
    pub fn open(path: impl Into<PathBuf>, flush_window: Duration) -> Result<Self> {
        let path = path.into();
        let inner = Arc::new(Inner {
            counts: Mutex::new(read_counts(&path)),
            path,
            dirty: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        });

        let flusher = Arc::clone(&inner);
        let debouncer = Debouncer::spawn("quicksnip-usage", flush_window, move || {
            if let Err(e) = flusher.flush() {
                warn!(error = %e, "could not write usage counts");
            }
        })?;

        Ok(Self { inner, debouncer })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Replaces the in-memory counts with the file's. Unflushed increments are lost.
    pub fn load(&self) -> usize {
        let counts = read_counts(&self.inner.path);
        let len = counts.len();
        *self.inner.counts.lock() = counts;
        self.inner.dirty.store(false, Ordering::SeqCst);
        len
    }

    /// Adds one use of `id` and returns the new count.
    pub fn increment(&self, id: &str) -> u64 {
        let count = {
            let mut counts = self.inner.counts.lock();
            let count = counts.entry(id.to_string()).or_insert(0);
            *count = count.saturating_add(1);
            *count
        };
        self.mark_dirty();
        count
    }

    pub fn get_count(&self, id: &str) -> u64 {
        self.inner.counts.lock().get(id).copied().unwrap_or(0)
    }

    pub fn get_all_counts(&self) -> HashMap<String, u64> {
        self.inner.counts.lock().clone()
    }

    /// Drops counters whose id is not in `valid_ids`; returns how many went.
    pub fn cleanup_orphaned<I, S>(&self, valid_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let valid: HashSet<String> = valid_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();

        let removed = {
            let mut counts = self.inner.counts.lock();
            let before = counts.len();
            counts.retain(|id, _| valid.contains(id));
            before - counts.len()
        };

        if removed > 0 {
            debug!(removed, "orphaned usage counters dropped");
            self.mark_dirty();
        }
        removed
    }

    /// True when counts changed since the last successful write.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Writes pending counts now. Reports `WriteFailure`; the counts stay pending.
    pub fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::SeqCst);
        self.debouncer.trigger();
    }
}

impl UsageLookup for UsageTracker {
    fn count(&self, id: &str) -> u64 {
        self.get_count(id)
    }
}

impl Drop for UsageTracker {
    fn drop(&mut self) {
        if let Err(e) = self.inner.flush() {
            warn!(error = %e, "could not write usage counts on shutdown");
        }
    }
}

fn read_counts(path: &Path) -> HashMap<String, u64> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no usage file yet");
            return HashMap::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read usage file, starting empty");
            return HashMap::new();
        }
    };

    if text.trim().is_empty() {
        return HashMap::new();
    }

    let parsed: UsageFileIn = match serde_yaml::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "usage file is corrupt, starting empty");
            return HashMap::new();
        }
    };

    let mut counts = HashMap::new();
    for (id, value) in parsed.snippet_usage.unwrap_or_default() {
        match value.as_u64() {
            Some(count) => {
                counts.insert(id, count);
            }
            None => warn!(id = %id, "skipping invalid usage count"),
        }
    }
    counts
}
