//! # Quicksnip Architecture
//!
//! Quicksnip is a **UI-agnostic snippet library**: it stores short, named,
//! tagged text fragments, finds them again with typo-tolerant search, and fills
//! in their placeholders. The popup window, hotkey and tray that a desktop user
//! sees are a shell around this crate; `qs` (the `quicksnip-cli` crate) is one
//! such shell.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Shell (qs CLI, GUI, ...)                                   │
//! │  - Reads input, prompts for placeholder values, delivers    │
//! │  - The ONLY place that knows about terminals and clipboards │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - One facade over store, usage, search and variables       │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────┬──────────────┬──────────────┬────────────────┐
//! │ search.rs    │ variables.rs │ usage.rs     │ store/         │
//! │ pure ranking │ pure parsing │ counters,    │ snippet file,  │
//! │              │              │ lazy writes  │ backups, watch │
//! └──────────────┴──────────────┴──────────────┴────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Code in this crate:
//! - Takes regular Rust arguments and returns regular Rust types
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//! - **Never** reads configuration from a global; a [`config::QuicksnipConfig`]
//!   value is passed to constructors
//!
//! ## Ownership
//!
//! - [`store::SnippetStore`] owns the snippet file and its backups.
//! - [`usage::UsageTracker`] owns the usage file.
//! - They refer to each other's data by snippet id only.
//!
//! ## Threads
//!
//! A store may be watched for external edits ([`store::SnippetStore::watch`]);
//! reloads then run on a watcher thread and are serialized against caller
//! operations by the store's lock. Usage counts are written from a debounce
//! thread. Both use [`debounce::Debouncer`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for shells
//! - [`store`]: Snippet persistence, backups and live reload
//! - [`search`]: Weighted fuzzy ranking
//! - [`variables`]: `{{name:default}}` placeholders
//! - [`usage`]: Usage counters
//! - [`tags`]: Tag normalization and suggestions
//! - [`model`]: Core data types (`Snippet`, `NewSnippet`, `SnippetUpdate`)
//! - [`config`]: Configuration loading
//! - [`debounce`]: Timer-based event coalescing
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod search;
pub mod store;
pub mod tags;
pub mod usage;
pub mod variables;

#[cfg(test)]
pub mod test_utils;

pub use api::QuicksnipApi;
pub use config::QuicksnipConfig;
pub use error::{QuicksnipError, Result};
pub use model::{NewSnippet, Snippet, SnippetUpdate};
