use crate::config::{EditorConfig, CONFIG_FILE};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway config directory.
pub struct TestEnv {
    // Kept so the directory lives as long as the env
    pub _temp_dir: TempDir,
    pub root: PathBuf,
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
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Writes `contents` to `name` under the root and returns its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("failed to write test file");
        path
    }

    pub fn write_config(&self, toml: &str) -> PathBuf {
        self.write(CONFIG_FILE, toml)
    }

    pub fn load_config(&self) -> EditorConfig {
        EditorConfig::load(&self.root).expect("failed to load config")
    }
}
