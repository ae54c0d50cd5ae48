//! # API Facade
//!
//! [`QuicksnipApi`] is the single entry point a shell (the `qs` CLI, a popup
//! GUI, ...) talks to. It owns one [`SnippetStore`], one [`UsageTracker`] and
//! one [`SearchEngine`], all built from the same configuration snapshot.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Wires components**: search gets the live snapshot and usage counts
//! - **Keeps them consistent**: removing snippets also prunes their counters
//! - **Returns structured types**: snippets, ranked hits, reports
//!
//! ## What the API Does NOT Do
//!
//! - **I/O with a person**: no stdout, no prompts; values for placeholders
//!   come through a [`ValuePrompt`] the shell supplies
//! - **Clipboard or windowing**: delivery is the shell's job, which then calls
//!   [`QuicksnipApi::record_use`]
//!
//! ## Shutdown Contract
//!
//! Usage counts are written lazily. The shell must call
//! [`QuicksnipApi::flush`] on its way out; dropping the API also attempts it.
//!
//! ## Delivering a Snippet
//!
//! ```text
//! search(query) -> pick id -> expand(id, prompt) -> deliver text -> record_use(id)
//! ```

use crate::config::QuicksnipConfig;
use crate::error::{QuicksnipError, Result};
use crate::model::{NewSnippet, Snippet, SnippetUpdate};
use crate::search::{RankedSnippet, SearchEngine};
use crate::store::{BackupInfo, LoadReport, Loaded, SnippetStore, Snapshot, SubscriptionId, WatchHandle};
use crate::tags::suggest_tags;
use crate::usage::UsageTracker;
use crate::variables::{self, Placeholder, ValuePrompt};
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct QuicksnipApi {
    store: SnippetStore,
    usage: UsageTracker,
    engine: SearchEngine,
    config: QuicksnipConfig,
    load_report: LoadReport,
}

impl QuicksnipApi {
    /// Builds every component from `config` and loads the snippet file.
    pub fn open(config: &QuicksnipConfig) -> Result<Self> {
        let store = SnippetStore::from_config(config);
        let usage = UsageTracker::open(config.usage_path(), config.usage_flush())?;
        let engine = SearchEngine::from_config(config);

        let mut api = Self::with_parts(store, usage, engine, config.clone());
        api.load_report = api.store.load().report;
        for problem in api.load_report.errors() {
            warn!("{}", problem);
        }
        Ok(api)
    }

    /// Assembles the facade from ready-made parts. Nothing is loaded.
    pub fn with_parts(
        store: SnippetStore,
        usage: UsageTracker,
        engine: SearchEngine,
        config: QuicksnipConfig,
    ) -> Self {
        Self {
            store,
            usage,
            engine,
            config,
            load_report: LoadReport::default(),
        }
    }

    pub fn config(&self) -> &QuicksnipConfig {
        &self.config
    }

    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    /// What the initial load in [`open`](Self::open) ran into.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    // --- Retrieval ---

    /// Ranked snippets for `query`; every snippet for a blank query.
    pub fn search(&self, query: &str) -> Vec<RankedSnippet> {
        let snapshot = self.store.snapshot();
        self.engine
            .search(&snapshot, query, &self.usage)
            .iter()
            .map(|hit| hit.to_ranked())
            .collect()
    }

    /// Every snippet, most used first.
    pub fn list(&self) -> Vec<RankedSnippet> {
        self.search("")
    }

    pub fn get(&self, id: &str) -> Option<Snippet> {
        self.store.get(id)
    }

    // --- Editing ---

    pub fn add(&self, snippet: NewSnippet) -> Result<Snippet> {
        self.store.add(snippet)
    }

    pub fn update(&self, id: &str, update: SnippetUpdate) -> Result<Option<Snippet>> {
        self.store.update(id, update)
    }

    /// Removes snippets and prunes the usage counters left behind.
    pub fn remove<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<String>> {
        let removed = self.store.remove(ids)?;
        if !removed.is_empty() {
            let snapshot = self.store.snapshot();
            self.usage
                .cleanup_orphaned(snapshot.iter().map(|s| s.id.as_str()));
        }
        Ok(removed)
    }

    // --- Placeholders ---

    pub fn detect_placeholders(&self, snippet: &Snippet) -> Vec<Placeholder> {
        variables::detect(&snippet.content)
    }

    pub fn substitute(&self, snippet: &Snippet, values: &HashMap<String, String>) -> String {
        variables::substitute(&snippet.content, values)
    }

    /// The delivery text for `id`, asking `prompt` for each placeholder.
    ///
    /// Fails with `NotFound` for an unknown id and `SubstitutionIncomplete`
    /// when the prompt is cancelled. Does not record a use.
    pub fn expand<P>(&self, id: &str, prompt: &mut P) -> Result<String>
    where
        P: ValuePrompt + ?Sized,
    {
        let snippet = self
            .get(id)
            .ok_or_else(|| QuicksnipError::NotFound(id.to_string()))?;
        let placeholders = self.detect_placeholders(&snippet);
        if placeholders.is_empty() {
            return Ok(snippet.content);
        }
        let values = variables::collect_values(&placeholders, prompt)?;
        Ok(self.substitute(&snippet, &values))
    }

    // --- Usage ---

    /// Counts one delivery of `id`. Unknown ids are ignored (returns false).
    pub fn record_use(&self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            debug!(id, "use of unknown snippet not recorded");
            return false;
        }
        self.usage.increment(id);
        true
    }

    pub fn usage_count(&self, id: &str) -> u64 {
        self.usage.get_count(id)
    }

    // --- Tags ---

    pub fn all_tags(&self) -> Vec<String> {
        self.store.all_tags()
    }

    pub fn suggest_tags(&self, prefix: &str, limit: usize) -> Vec<String> {
        suggest_tags(prefix, &self.all_tags(), limit)
    }

    // --- Backups ---

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        self.store.list_backups()
    }

    pub fn restore_backup(&self, index: usize) -> Result<Snapshot> {
        self.store.restore_backup(index)
    }

    // --- Live Reload ---

    /// `callback` runs after every external reload or backup restore.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Watches the snippet file with the configured debounce window.
    pub fn watch(&self) -> Result<WatchHandle> {
        self.store.watch(self.config.reload_debounce())
    }

    /// Re-reads the snippet file now and notifies subscribers.
    pub fn reload(&self) -> Loaded {
        self.store.reload()
    }

    /// Writes pending usage counts. Call before the host exits.
    pub fn flush(&self) -> Result<()> {
        self.usage.flush()
    }
}
