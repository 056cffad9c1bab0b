//! Read-only views of the host used by verification

use std::cell::OnceCell;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::common::search_path::find_program;

/// Questions verification asks about the host
pub trait Probe {
    fn has_program(&self, name: &str) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_text(&self, path: &Path) -> Option<String>;
    fn service_enabled(&self, unit: &str) -> bool;
    fn font_installed(&self, family: &str) -> bool;
}

/// Probe backed by the real file system, `systemctl` and `fc-list`
#[derive(Debug, Default)]
pub struct SystemProbe {
    font_families: OnceCell<String>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn families(&self) -> &str {
        self.font_families.get_or_init(|| {
            Command::new("fc-list")
                .args([":", "family"])
                .stderr(Stdio::null())
                .output()
                .ok()
                .filter(|output| output.status.success())
                .map(|output| String::from_utf8_lossy(&output.stdout).to_lowercase())
                .unwrap_or_default()
        })
    }
}

impl Probe for SystemProbe {
    fn has_program(&self, name: &str) -> bool {
        find_program(name).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn service_enabled(&self, unit: &str) -> bool {
        Command::new("systemctl")
            .args(["is-enabled", "--quiet", unit])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn font_installed(&self, family: &str) -> bool {
        let wanted = family.to_lowercase();
        self.families()
            .lines()
            .flat_map(|line| line.split(','))
            .any(|name| name.trim() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_system_questions() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let file = temp.path().join(".profile");
        std::fs::write(&file, "umask 022\n").unwrap();
        let probe = SystemProbe::new();

        assert!(probe.is_file(&file));
        assert!(!probe.is_dir(&file));
        assert!(probe.is_dir(temp.path()));
        assert_eq!(probe.read_text(&file).as_deref(), Some("umask 022\n"));
        assert_eq!(probe.read_text(&temp.path().join("missing")), None);
        assert!(probe.has_program("sh"));
    }

    #[test]
    fn test_unknown_font_is_not_installed() {
        assert!(!SystemProbe::new().font_installed("Deskforge Imaginary Sans"));
    }
}
