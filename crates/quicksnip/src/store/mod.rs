//! # Storage Layer
//!
//! [`SnippetStore`] is the single owner of the snippet collection and the only
//! writer of the snippet file and its backups.
//!
//! ## Shape
//!
//! - **Truth**: one YAML document on disk (see [`document`]).
//! - **Cache**: the last loaded collection, held as an immutable [`Snapshot`].
//!   Readers clone the `Arc`, never the snippets, and never see a collection
//!   mid-update: every change builds a new vector and swaps it in.
//!
//! ## Locking
//!
//! One reader-writer lock per store guards the snapshot and the digest of the
//! last text read or written. Writers (`load`, `save`, `add`, `update`,
//! `remove`, `restore_backup`, watcher reloads) hold it across the whole
//! read-modify-write, so they never interleave. Subscribers are always called
//! after the lock is released, so a callback may call back into the store.
//!
//! ## Failure Policy
//!
//! | Situation | Outcome |
//! |---|---|
//! | File missing | sample library written and returned |
//! | File unparsable | newest parsable backup used, else empty; reported |
//! | Entry invalid | entry skipped; reported |
//! | Read error | last good collection kept; reported |
//! | Entry invalid on save | `EntryInvalid` returned; nothing written |
//! | Write error | `WriteFailure` returned to the caller |
//! | Backup rotation error | error returned; the file is not overwritten |
//!
//! `load` never returns an error. Problems come back in a [`LoadReport`].
//!
//! ## Backups
//!
//! Before every write the current file is copied to `<file>.backup.001`, the
//! previous copies shift up one slot, and anything beyond `backup_count` is
//! discarded. The sample library written on first run is not backed up.
//!
//! ## External Edits
//!
//! [`SnippetStore::watch`] reloads the collection when the file changes on
//! disk and hands the new snapshot to subscribers. Changes that match the last
//! text the store itself wrote are ignored.
//!
//! ## Implementations
//!
//! - [`FsBackend`]: the real file, with atomic tmp-then-rename writes.
//! - [`MemBackend`]: for testing store logic without filesystem I/O.

pub mod backend;
pub mod defaults;
pub mod document;
pub mod fs_backend;
pub mod mem_backend;
mod watch;

pub use backend::{BackupInfo, StorageBackend};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use watch::WatchHandle;

use crate::config::QuicksnipConfig;
use crate::error::{QuicksnipError, Result};
use crate::model::{self, slugify, NewSnippet, Snippet, SnippetUpdate};
use crate::tags::{collect_tags, normalize_tags};
use chrono::SubsecRound;
use document::{claim_id, Decoded};
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Read-only view of the collection, in load order.
pub type Snapshot = Arc<[Snippet]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// What happened during a load, beyond the snippets themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of snippets now held.
    pub snippets: usize,
    /// One message per skipped entry.
    pub invalid_entries: Vec<String>,
    /// `(original, assigned)` for duplicate ids that were renamed.
    pub renamed_ids: Vec<(String, String)>,
    /// Parse error of the main file, when it could not be read as a whole.
    pub corruption: Option<String>,
    /// Backup slot the collection was recovered from.
    pub recovered_from_backup: Option<usize>,
    /// I/O problem reading the file, or writing the sample library.
    pub storage_error: Option<String>,
    /// The file did not exist and the sample library was created.
    pub created_defaults: bool,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_entries.is_empty()
            && self.corruption.is_none()
            && self.storage_error.is_none()
    }

    /// The reported problems, as errors the caller can display.
    pub fn errors(&self) -> Vec<QuicksnipError> {
        let mut errors: Vec<QuicksnipError> = self
            .invalid_entries
            .iter()
            .map(|msg| QuicksnipError::EntryInvalid(msg.clone()))
            .collect();
        if let Some(corruption) = &self.corruption {
            errors.push(QuicksnipError::StorageCorrupt(corruption.clone()));
        }
        if let Some(storage) = &self.storage_error {
            errors.push(QuicksnipError::Api(storage.clone()));
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub snippets: Snapshot,
    pub report: LoadReport,
}

struct StoreState {
    snippets: Snapshot,
    /// SHA-256 of the file text last read or written by this store.
    digest: Option<Vec<u8>>,
}

pub(crate) struct Inner {
    backend: Box<dyn StorageBackend>,
    backup_count: usize,
    state: RwLock<StoreState>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

/// Thread-safe handle to the snippet collection. Clones share one store.
#[derive(Clone)]
pub struct SnippetStore {
    inner: Arc<Inner>,
}

fn digest(text: &str) -> Vec<u8> {
    Sha256::digest(text.as_bytes()).to_vec()
}

impl SnippetStore {
    /// A store over `backend`. Nothing is read until [`load`](Self::load).
    pub fn new<B: StorageBackend + 'static>(backend: B, backup_count: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                backup_count,
                state: RwLock::new(StoreState {
                    snippets: Arc::from(Vec::new()),
                    digest: None,
                }),
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    pub fn from_config(config: &QuicksnipConfig) -> Self {
        Self::new(FsBackend::new(config.snippet_path()), config.backup_count)
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    pub fn location(&self) -> PathBuf {
        self.inner.backend.location()
    }

    pub fn backup_count(&self) -> usize {
        self.inner.backup_count
    }

    // --- Reading ---

    /// Current collection. Cheap: shares the snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.inner.state.read().snippets)
    }

    pub fn get(&self, id: &str) -> Option<Snippet> {
        self.inner
            .state
            .read()
            .snippets
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every distinct tag in use, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        collect_tags(&self.snapshot())
    }

    // --- Loading ---

    /// Reads the file and replaces the in-memory collection.
    pub fn load(&self) -> Loaded {
        let mut state = self.inner.state.write();
        let report = self.inner.load_locked(&mut state);
        Loaded {
            snippets: Arc::clone(&state.snippets),
            report,
        }
    }

    /// Loads and hands the result to subscribers.
    pub fn reload(&self) -> Loaded {
        let loaded = self.load();
        self.inner.notify(Arc::clone(&loaded.snippets));
        loaded
    }

    /// Reloads only when the file differs from what this store last saw.
    ///
    /// Used by the watcher. A missing file is ignored rather than replaced
    /// with the sample library.
    pub fn reload_if_changed(&self) -> Option<Loaded> {
        let text = match self.inner.backend.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("snippet file disappeared, keeping current collection");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "could not read snippet file after change");
                return None;
            }
        };

        let current = digest(&text);
        if self.inner.state.read().digest.as_deref() == Some(current.as_slice()) {
            debug!("snippet file unchanged since last read or write, skipping reload");
            return None;
        }

        info!(path = %self.location().display(), "snippet file changed externally, reloading");
        Some(self.reload())
    }

    // --- Writing ---

    /// Persists `snippets` as the whole collection.
    ///
    /// Every entry needs a non-blank id and name, or nothing is written. Ids
    /// are trimmed, timestamps cut to whole seconds, tags normalized and
    /// duplicate ids repaired, so the collection held afterwards is exactly
    /// what the next load reads back. The current file is rotated into the
    /// backups first.
    pub fn save(&self, snippets: Vec<Snippet>) -> Result<()> {
        let mut state = self.inner.state.write();
        self.inner.write_locked(&mut state, snippets, true)
    }

    /// Adds a snippet, assigning a unique id and both timestamps.
    pub fn add(&self, new: NewSnippet) -> Result<Snippet> {
        if new.name.trim().is_empty() {
            return Err(QuicksnipError::EntryInvalid(
                "a snippet needs a name".to_string(),
            ));
        }

        let mut state = self.inner.state.write();
        let mut taken: HashSet<String> = state.snippets.iter().map(|s| s.id.clone()).collect();

        let base = new
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| slugify(&new.name));
        let base = if base.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            base
        };
        let id = claim_id(&base, &mut taken);

        let now = model::now();
        let snippet = Snippet {
            id,
            name: new.name,
            description: new.description,
            content: new.content,
            tags: normalize_tags(&new.tags),
            created: now,
            modified: now,
        };

        let mut next = state.snippets.to_vec();
        next.push(snippet.clone());
        self.inner.write_locked(&mut state, next, true)?;

        info!(id = %snippet.id, "snippet added");
        Ok(snippet)
    }

    /// Applies `update` to the snippet with `id`.
    ///
    /// Returns `Ok(None)` for an unknown id; nothing is written.
    pub fn update(&self, id: &str, update: SnippetUpdate) -> Result<Option<Snippet>> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(QuicksnipError::EntryInvalid(
                "a snippet needs a name".to_string(),
            ));
        }

        let mut state = self.inner.state.write();
        let Some(position) = state.snippets.iter().position(|s| s.id == id) else {
            debug!(id, "update of unknown snippet ignored");
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(state.snippets[position].clone()));
        }

        let mut next = state.snippets.to_vec();
        let snippet = &mut next[position];
        if let Some(name) = update.name {
            snippet.name = name;
        }
        if let Some(description) = update.description {
            snippet.description = description;
        }
        if let Some(content) = update.content {
            snippet.content = content;
        }
        if let Some(tags) = update.tags {
            snippet.tags = normalize_tags(&tags);
        }
        snippet.modified = model::now().max(snippet.created);
        let updated = snippet.clone();

        self.inner.write_locked(&mut state, next, true)?;
        info!(id, "snippet updated");
        Ok(Some(updated))
    }

    /// Removes every snippet whose id is listed. Unknown ids are ignored.
    ///
    /// Returns the ids actually removed; the file is only written if that is
    /// non-empty.
    pub fn remove<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<String>> {
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();

        let mut state = self.inner.state.write();
        let (removed, kept): (Vec<Snippet>, Vec<Snippet>) = state
            .snippets
            .iter()
            .cloned()
            .partition(|s| wanted.contains(s.id.as_str()));

        if removed.is_empty() {
            debug!(count = ids.len(), "nothing to remove");
            return Ok(Vec::new());
        }

        self.inner.write_locked(&mut state, kept, true)?;
        let removed: Vec<String> = removed.into_iter().map(|s| s.id).collect();
        info!(count = removed.len(), "snippets removed");
        Ok(removed)
    }

    // --- Backups ---

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        self.inner.backend.list_backups()
    }

    /// Makes backup `index` the current collection.
    ///
    /// The backup must parse as a document. It is saved through the normal
    /// write path, so the file it replaces becomes backup 1.
    pub fn restore_backup(&self, index: usize) -> Result<Snapshot> {
        let text = self
            .inner
            .backend
            .read_backup(index)?
            .ok_or_else(|| QuicksnipError::NotFound(format!("backup {}", index)))?;
        let decoded = document::decode(&text)?;
        for msg in &decoded.invalid {
            warn!(backup = index, "{}", msg);
        }

        let snapshot = {
            let mut state = self.inner.state.write();
            self.inner.write_locked(&mut state, decoded.snippets, true)?;
            Arc::clone(&state.snippets)
        };

        info!(backup = index, snippets = snapshot.len(), "backup restored");
        self.inner.notify(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    // --- Notification ---

    /// Registers `callback` for every reload and restore.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Starts watching the snippet file. Dropping the handle stops it.
    pub fn watch(&self, window: Duration) -> Result<WatchHandle> {
        let path = self.inner.backend.watch_path().ok_or_else(|| {
            QuicksnipError::Api("storage backend has no file to watch".to_string())
        })?;
        watch::start(Arc::downgrade(&self.inner), path, window)
    }
}

impl Inner {
    fn load_locked(&self, state: &mut StoreState) -> LoadReport {
        let mut report = LoadReport::default();

        match self.backend.read() {
            Ok(None) => self.create_defaults(state, &mut report),
            Ok(Some(text)) => {
                let text_digest = digest(&text);
                match document::decode(&text) {
                    Ok(decoded) => self.apply(state, decoded, &mut report),
                    Err(e) => {
                        warn!(error = %e, path = %self.backend.location().display(), "snippet file is corrupt");
                        report.corruption = Some(e.to_string());
                        match self.recover_from_backup() {
                            Some((index, decoded)) => {
                                report.recovered_from_backup = Some(index);
                                self.apply(state, decoded, &mut report);
                            }
                            None => {
                                error!("no usable backup, starting with an empty collection");
                                state.snippets = Arc::from(Vec::new());
                            }
                        }
                    }
                }
                state.digest = Some(text_digest);
            }
            Err(e) => {
                warn!(error = %e, "could not read snippet file, keeping current collection");
                report.storage_error = Some(e.to_string());
            }
        }

        report.snippets = state.snippets.len();
        debug!(snippets = report.snippets, "snippets loaded");
        report
    }

    fn create_defaults(&self, state: &mut StoreState, report: &mut LoadReport) {
        let snippets = match document::decode(defaults::DEFAULT_DOCUMENT) {
            Ok(decoded) => decoded.snippets,
            Err(e) => {
                error!(error = %e, "built-in sample library failed to parse");
                Vec::new()
            }
        };

        match self.write_locked(state, snippets.clone(), false) {
            Ok(()) => {
                info!(path = %self.backend.location().display(), "created sample snippet file");
                report.created_defaults = true;
            }
            Err(e) => {
                warn!(error = %e, "could not create sample snippet file");
                report.storage_error = Some(e.to_string());
                state.snippets = Arc::from(snippets);
            }
        }
    }

    fn apply(&self, state: &mut StoreState, decoded: Decoded, report: &mut LoadReport) {
        for msg in &decoded.invalid {
            warn!("skipping invalid snippet: {}", msg);
        }
        for (original, assigned) in &decoded.renamed {
            warn!(original = %original, assigned = %assigned, "duplicate snippet id renamed");
        }
        report.invalid_entries = decoded.invalid;
        report.renamed_ids = decoded.renamed;
        state.snippets = Arc::from(decoded.snippets);
    }

    fn recover_from_backup(&self) -> Option<(usize, Decoded)> {
        let backups = match self.backend.list_backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(error = %e, "could not list backups");
                return None;
            }
        };

        for backup in backups {
            match self.backend.read_backup(backup.index) {
                Ok(Some(text)) => match document::decode(&text) {
                    Ok(decoded) => {
                        warn!(backup = backup.index, "recovered snippets from backup");
                        return Some((backup.index, decoded));
                    }
                    Err(e) => warn!(backup = backup.index, error = %e, "backup is corrupt too"),
                },
                Ok(None) => {}
                Err(e) => warn!(backup = backup.index, error = %e, "could not read backup"),
            }
        }
        None
    }

    fn write_locked(&self, state: &mut StoreState, snippets: Vec<Snippet>, backup: bool) -> Result<()> {
        let snippets = prepare(snippets)?;
        let text = document::encode(&snippets)?;

        if backup {
            if let Err(e) = self.backend.rotate_backups(self.backup_count) {
                warn!(error = %e, "backup rotation failed, snippet file left untouched");
                return Err(e);
            }
        }
        self.backend.write(&text)?;

        state.snippets = Arc::from(snippets);
        state.digest = Some(digest(&text));
        Ok(())
    }

    fn notify(&self, snapshot: Snapshot) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(Arc::clone(&snapshot));
        }
    }
}

/// Brings a collection to the exact form the snippet file stores.
fn prepare(mut snippets: Vec<Snippet>) -> Result<Vec<Snippet>> {
    for (position, snippet) in snippets.iter().enumerate() {
        if !snippet.is_valid() {
            return Err(QuicksnipError::EntryInvalid(format!(
                "entry {}: a snippet needs a non-blank id and name",
                position + 1
            )));
        }
    }

    let mut taken = HashSet::with_capacity(snippets.len());
    for snippet in &mut snippets {
        let trimmed = snippet.id.trim();
        if trimmed.len() != snippet.id.len() {
            snippet.id = trimmed.to_string();
        }
        snippet.created = snippet.created.trunc_subsecs(0);
        snippet.modified = snippet.modified.trunc_subsecs(0);
        snippet.tags = normalize_tags(&snippet.tags);
        if taken.contains(&snippet.id) {
            let original = std::mem::take(&mut snippet.id);
            snippet.id = claim_id(&original, &mut taken);
            warn!(original = %original, assigned = %snippet.id, "duplicate snippet id renamed");
        } else {
            taken.insert(snippet.id.clone());
        }
    }
    Ok(snippets)
}
