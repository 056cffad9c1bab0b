//! Run configuration
//!
//! [`Config`] is built once at startup and passed by reference into every
//! component. It joins the user's [`Settings`] (built-in defaults, optionally
//! overridden by a YAML file) with the [`Paths`] derived from the home and
//! cache directories.

pub mod settings;

use std::path::{Path, PathBuf};

use crate::error::{DeskforgeError, Result};

pub use settings::{
    BuildComponent, FileMapping, LineEdit, Settings, StackSettings, TreeMapping,
};

/// Application directory name under the user's cache and config directories
const APP_DIR: &str = "deskforge";

/// Settings file name under `<config dir>/deskforge`
const SETTINGS_FILE: &str = "config.yaml";

/// Subdirectory of the cache holding synchronized mirrors
const MIRRORS_DIR: &str = "mirrors";

/// Mirror directory of the dotfiles repository
pub const DOTFILES_MIRROR: &str = "dotfiles";

/// Filesystem locations a run reads and writes
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub home: PathBuf,
    /// Login profile holding the managed `env` and `session` blocks
    pub profile: PathBuf,
    pub cache: PathBuf,
    pub mirrors: PathBuf,
    pub local_bin: PathBuf,
}

impl Paths {
    /// Locate the directories of the invoking user
    ///
    /// The cache can be moved with the `DESKFORGE_CACHE_DIR` environment variable.
    pub fn discover(profile_file: &str) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| DeskforgeError::DirectoryUnavailable {
            what: "home".to_string(),
        })?;

        let cache = match std::env::var("DESKFORGE_CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::cache_dir()
                .unwrap_or_else(|| home.join(".cache"))
                .join(APP_DIR),
        };

        Ok(Self::rooted(&home, &cache, profile_file))
    }

    /// Layout under explicit roots
    pub fn rooted(home: &Path, cache: &Path, profile_file: &str) -> Self {
        Self {
            home: home.to_path_buf(),
            profile: home.join(profile_file),
            cache: cache.to_path_buf(),
            mirrors: cache.join(MIRRORS_DIR),
            local_bin: home.join(".local").join("bin"),
        }
    }

    /// Local working copy of a named mirror
    pub fn mirror(&self, name: &str) -> PathBuf {
        self.mirrors.join(name)
    }

    /// Path under the home directory
    pub fn in_home(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }
}

/// Immutable configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    pub settings: Settings,
}

impl Config {
    /// Load settings and discover paths
    ///
    /// An explicit settings path must exist. Without one, the default
    /// `<config dir>/deskforge/config.yaml` is used when present and the
    /// built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let settings = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(DeskforgeError::ConfigNotFound {
                        path: path.display().to_string(),
                    });
                }
                read_settings(path)?
            }
            None => match default_settings_path() {
                Some(path) if path.is_file() => read_settings(&path)?,
                _ => Settings::default(),
            },
        };

        let paths = Paths::discover(&settings.profile_file)?;
        tracing::debug!(
            home = %paths.home.display(),
            cache = %paths.cache.display(),
            "paths discovered"
        );

        Ok(Self { paths, settings })
    }

    /// Configuration rooted at explicit directories (used by tests)
    #[cfg(test)]
    pub fn rooted(root: &Path, settings: Settings) -> Self {
        let paths = Paths::rooted(
            &root.join("home"),
            &root.join("cache"),
            &settings.profile_file,
        );
        Self { paths, settings }
    }

    pub fn dotfiles_mirror(&self) -> PathBuf {
        self.paths.mirror(DOTFILES_MIRROR)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

fn read_settings(path: &Path) -> Result<Settings> {
    tracing::debug!(path = %path.display(), "reading settings");
    let text = std::fs::read_to_string(path).map_err(|e| DeskforgeError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Settings::from_yaml(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rooted_layout() {
        let paths = Paths::rooted(
            Path::new("/home/ada"),
            Path::new("/home/ada/.cache/deskforge"),
            ".zprofile",
        );

        assert_eq!(paths.profile, PathBuf::from("/home/ada/.zprofile"));
        assert_eq!(paths.mirrors, PathBuf::from("/home/ada/.cache/deskforge/mirrors"));
        assert_eq!(paths.local_bin, PathBuf::from("/home/ada/.local/bin"));
        assert_eq!(
            paths.mirror("dwm"),
            PathBuf::from("/home/ada/.cache/deskforge/mirrors/dwm")
        );
    }

    #[test]
    fn test_explicit_missing_settings_file_is_an_error() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let missing = temp.path().join("nope.yaml");

        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, DeskforgeError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_explicit_settings_file_is_read() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file = temp.path().join("deskforge.yaml");
        std::fs::write(&file, "aur:\n  helper: yay\n").unwrap();

        let settings = read_settings(&file).unwrap();
        assert_eq!(settings.aur.helper, "yay");
        assert!(settings.aur.apps.is_empty());
    }
}
