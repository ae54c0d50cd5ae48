//! Reloading the store when its file changes on disk.
//!
//! The parent directory is watched rather than the file itself: editors and
//! our own atomic writes replace the file by rename, which drops a watch
//! placed on the old inode.
//!
//! notify callback -> [`Trigger::fire`] -> debounce window -> reload

use super::fs_backend::parent_dir;
use super::{Inner, SnippetStore};
use crate::debounce::{Debouncer, Trigger};
use crate::error::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Weak;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Keeps the watcher alive. Dropping it stops watching.
pub struct WatchHandle {
    // Field order matters: the watcher (holding a trigger) goes before the
    // debouncer joins its thread.
    _watcher: RecommendedWatcher,
    _debouncer: Debouncer,
    path: PathBuf,
}

impl WatchHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(super) fn start(store: Weak<Inner>, path: PathBuf, window: Duration) -> Result<WatchHandle> {
    let dir = parent_dir(&path);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();

    let debouncer = Debouncer::spawn("quicksnip-reload", window, move || {
        if let Some(inner) = store.upgrade() {
            SnippetStore::from_inner(inner).reload_if_changed();
        }
    })?;

    let trigger = debouncer.trigger_handle();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => on_event(&event, &file_name, &trigger),
        Err(e) => warn!(error = %e, "file watch error"),
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    info!(path = %path.display(), window_ms = window.as_millis() as u64, "watching snippet file");
    Ok(WatchHandle {
        _watcher: watcher,
        _debouncer: debouncer,
        path,
    })
}

fn on_event(event: &Event, file_name: &OsString, trigger: &Trigger) {
    if is_relevant(event, file_name) {
        debug!(kind = ?event.kind, "snippet file event");
        trigger.fire();
    }
}

fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
