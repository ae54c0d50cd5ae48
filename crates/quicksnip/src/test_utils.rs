use crate::api::QuicksnipApi;
use crate::config::QuicksnipConfig;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub config: QuicksnipConfig,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let config = QuicksnipConfig {
            snippet_file: Some(root.join("snippets.yaml")),
            usage_file: Some(root.join("usage.yaml")),
            reload_debounce_ms: 50,
            usage_flush_ms: 60_000,
            ..Default::default()
        };
        Self {
            _temp_dir: temp_dir,
            root,
            config,
        }
    }

    pub fn snippet_file(&self) -> PathBuf {
        self.config.snippet_path()
    }

    pub fn write_snippets(&self, text: &str) {
        std::fs::write(self.snippet_file(), text).expect("failed to write snippet file");
    }

    pub fn api(&self) -> QuicksnipApi {
        QuicksnipApi::open(&self.config).expect("failed to open api")
    }
}
