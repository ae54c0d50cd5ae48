//! # Configuration
//!
//! Quicksnip configuration is loaded with [`confique`], layering environment
//! variables over a TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `QUICKSNIP_SNIPPET_FILE`, `QUICKSNIP_MAX_RESULTS`, etc.
//! 2. **Config file**: `config.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! The loaded value is an immutable snapshot handed to constructors. Nothing
//! reads configuration from a global.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `snippet_file` | `<data dir>/snippets.yaml` | Snippet document |
//! | `usage_file` | `<data dir>/usage.yaml` | Usage counters |
//! | `fuzzy_threshold` | `60` | Minimum composite score (0-100) for a search hit |
//! | `max_results` | `10` | Search result limit |
//! | `backup_count` | `5` | Snippet file backups kept |
//! | `reload_debounce_ms` | `500` | Quiet time before an external edit is reloaded |
//! | `usage_flush_ms` | `2000` | Quiet time before usage counts are written |

use crate::error::{QuicksnipError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration for quicksnip, stored in `config.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuicksnipConfig {
    /// Path of the snippet document. Defaults to `snippets.yaml` in the data directory.
    #[config(env = "QUICKSNIP_SNIPPET_FILE")]
    pub snippet_file: Option<PathBuf>,

    /// Path of the usage counter file. Defaults to `usage.yaml` in the data directory.
    #[config(env = "QUICKSNIP_USAGE_FILE")]
    pub usage_file: Option<PathBuf>,

    /// Minimum composite score (0-100) a snippet needs to appear in results.
    #[config(env = "QUICKSNIP_FUZZY_THRESHOLD", default = 60)]
    pub fuzzy_threshold: u8,

    /// Maximum number of search results.
    #[config(env = "QUICKSNIP_MAX_RESULTS", default = 10)]
    pub max_results: usize,

    /// Number of snippet file backups to keep.
    #[config(env = "QUICKSNIP_BACKUP_COUNT", default = 5)]
    pub backup_count: usize,

    /// Milliseconds of quiet before an external edit is reloaded.
    #[config(env = "QUICKSNIP_RELOAD_DEBOUNCE_MS", default = 500)]
    pub reload_debounce_ms: u64,

    /// Milliseconds of quiet before usage counts are written.
    #[config(env = "QUICKSNIP_USAGE_FLUSH_MS", default = 2000)]
    pub usage_flush_ms: u64,
}

impl Default for QuicksnipConfig {
    fn default() -> Self {
        Self {
            snippet_file: None,
            usage_file: None,
            fuzzy_threshold: 60,
            max_results: 10,
            backup_count: 5,
            reload_debounce_ms: 500,
            usage_flush_ms: 2000,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "quicksnip")
}

impl QuicksnipConfig {
    /// Loads from the environment and the default config file.
    pub fn load() -> Result<Self> {
        Self::load_from(Some(&Self::default_config_file()))
    }

    /// Loads from the environment and, if given, `file`. A missing file is skipped.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| QuicksnipError::Config(e.to_string()))
    }

    pub fn default_config_file() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(".quicksnip").join(CONFIG_FILE_NAME))
    }

    pub fn default_data_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".quicksnip"))
    }

    pub fn snippet_path(&self) -> PathBuf {
        self.snippet_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("snippets.yaml"))
    }

    pub fn usage_path(&self) -> PathBuf {
        self.usage_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("usage.yaml"))
    }

    pub fn reload_debounce(&self) -> Duration {
        Duration::from_millis(self.reload_debounce_ms)
    }

    pub fn usage_flush(&self) -> Duration {
        Duration::from_millis(self.usage_flush_ms)
    }

    /// Every out-of-range setting, one message each. Empty when all is well.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(5..=20).contains(&self.max_results) {
            problems.push(format!(
                "max_results must be between 5 and 20 (got {})",
                self.max_results
            ));
        }
        if !(40..=80).contains(&self.fuzzy_threshold) {
            problems.push(format!(
                "fuzzy_threshold must be between 40 and 80 (got {})",
                self.fuzzy_threshold
            ));
        }
        if !(1..=50).contains(&self.backup_count) {
            problems.push(format!(
                "backup_count must be between 1 and 50 (got {})",
                self.backup_count
            ));
        }
        if self.reload_debounce_ms == 0 {
            problems.push("reload_debounce_ms must be greater than 0".to_string());
        }
        if self.usage_flush_ms == 0 {
            problems.push("usage_flush_ms must be greater than 0".to_string());
        }
        for (key, path) in [
            ("snippet_file", &self.snippet_file),
            ("usage_file", &self.usage_file),
        ] {
            if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                problems.push(format!("{} must not be empty", key));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = QuicksnipConfig::default();
        assert_eq!(config.fuzzy_threshold, 60);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.backup_count, 5);
        assert_eq!(config.reload_debounce(), Duration::from_millis(500));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_paths_share_data_dir() {
        let config = QuicksnipConfig::default();
        assert_eq!(config.snippet_path().parent(), config.usage_path().parent());
        assert!(config.snippet_path().ends_with("snippets.yaml"));
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = QuicksnipConfig {
            snippet_file: Some(PathBuf::from("/tmp/s.yaml")),
            usage_file: Some(PathBuf::from("/tmp/u.yaml")),
            ..Default::default()
        };
        assert_eq!(config.snippet_path(), PathBuf::from("/tmp/s.yaml"));
        assert_eq!(config.usage_path(), PathBuf::from("/tmp/u.yaml"));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = QuicksnipConfig {
            fuzzy_threshold: 95,
            max_results: 2,
            backup_count: 0,
            usage_flush_ms: 0,
            snippet_file: Some(PathBuf::new()),
            ..Default::default()
        };
        let problems = config.validate();
        assert_eq!(problems.len(), 5);
        assert!(problems.iter().any(|p| p.contains("fuzzy_threshold")));
        assert!(problems.iter().any(|p| p.contains("snippet_file")));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "max_results = 15\nfuzzy_threshold = 70\n").unwrap();
        let config = QuicksnipConfig::load_from(Some(&file)).unwrap();
        assert_eq!(config.max_results, 15);
        assert_eq!(config.fuzzy_threshold, 70);
        assert_eq!(config.backup_count, 5);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuicksnipConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.max_results, QuicksnipConfig::default().max_results);
    }

    #[test]
    fn test_load_rejects_bad_types() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "max_results = \"many\"\n").unwrap();
        let err = QuicksnipConfig::load_from(Some(&file)).unwrap_err();
        assert!(matches!(err, QuicksnipError::Config(_)));
    }

    #[test]
    fn test_serializes_to_toml() {
        let text = toml::to_string(&QuicksnipConfig::default()).unwrap();
        assert!(text.contains("max_results = 10"));
    }
}
