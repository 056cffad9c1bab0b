//! Common test utilities for deskforge integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated user environment: home, config and cache live in a temp dir
pub struct TestHome {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path used as `$HOME`
    pub home: PathBuf,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home).expect("Failed to create home directory");
        Self { temp, home }
    }

    /// deskforge command confined to this environment
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("deskforge").expect("deskforge binary not built");
        cmd.env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env("XDG_CACHE_HOME", self.home.join(".cache"))
            .env("DESKFORGE_CACHE_DIR", self.temp.path().join("cache"))
            .env_remove("DESKFORGE_CONFIG")
            .env_remove("DESKFORGE_LOG");
        cmd
    }

    /// Write a file under the temp dir, creating parents
    #[allow(dead_code)]
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Whether a path relative to `$HOME` exists
    #[allow(dead_code)]
    pub fn home_has(&self, relative: &str) -> bool {
        self.home.join(relative).exists()
    }

    #[allow(dead_code)]
    pub fn cache(&self) -> &Path {
        self.temp.path()
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}
