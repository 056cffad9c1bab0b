//! Preview executor: records and prints actions, performs none

use std::path::{Path, PathBuf};

use console::Style;

use super::{Action, Executor};
use crate::error::Result;

/// Executor for `--dry-run`
///
/// Keeps an overlay of paths the previewed actions would have created or
/// moved away, so later existence checks in the same run see the same world
/// a real run would.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    journal: Vec<String>,
    echo: bool,
    /// Paths touched by previewed actions, oldest first
    overlay: Vec<(PathBuf, Presence)>,
}

/// What a previewed action left at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Absent,
    /// A file or a freshly created, empty directory
    Entry,
    /// A clone or merged tree whose contents are unknown
    Populated,
}

impl DryRunExecutor {
    /// Executor printing `[dry-run] <action>` for every action
    pub fn new() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Executor that only records
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self::default()
    }

    fn mark(&mut self, path: &Path, presence: Presence) {
        self.overlay.push((path.to_path_buf(), presence));
    }
}

impl Executor for DryRunExecutor {
    fn execute(&mut self, action: Action) -> Result<()> {
        let description = action.to_string();
        if self.echo {
            println!(
                "{} {}",
                Style::new().yellow().bold().apply_to("[dry-run]"),
                description
            );
        }
        tracing::debug!(action = %description, "previewed");
        self.journal.push(description);

        match &action {
            Action::CreateDir { path } | Action::WriteFile { path, .. } => {
                self.mark(path, Presence::Entry)
            }
            Action::CopyFile { to, .. } => self.mark(to, Presence::Entry),
            Action::CopyTree { to, .. } => self.mark(to, Presence::Populated),
            Action::Rename { from, to } => {
                self.mark(from, Presence::Absent);
                self.mark(to, Presence::Populated);
            }
            Action::GitClone { path, .. } => self.mark(path, Presence::Populated),
            Action::Run(_)
            | Action::GitFetch { .. }
            | Action::GitSwitch { .. }
            | Action::GitFastForward { .. } => {}
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        for (entry, presence) in self.overlay.iter().rev() {
            if entry == path {
                return *presence != Presence::Absent;
            }
            if path.starts_with(entry) {
                match presence {
                    Presence::Populated => return true,
                    Presence::Absent => return false,
                    Presence::Entry => {}
                }
            }
        }
        path.exists()
    }

    fn journal(&self) -> &[String] {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandSpec;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_records_and_performs_nothing() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let target = temp.path().join("profile");
        let mut exec = DryRunExecutor::quiet();

        exec.execute(Action::WriteFile {
            path: target.clone(),
            contents: "export EDITOR=nvim\n".to_string(),
            mode: None,
            privileged: false,
        })
        .unwrap();

        assert!(!target.exists());
        assert_eq!(exec.journal().len(), 1);
        assert!(exec.journal()[0].starts_with("write "));
    }

    #[test]
    fn test_dry_run_never_fails_commands() {
        let mut exec = DryRunExecutor::quiet();
        let result = exec.execute(Action::Run(CommandSpec::new(
            "definitely-not-a-real-program",
            ["--explode"],
        )));
        assert!(result.is_ok());
    }

    #[test]
    fn test_clone_makes_mirror_contents_visible() {
        let mut exec = DryRunExecutor::quiet();
        let mirror = PathBuf::from("/nonexistent/cache/mirrors/dwm");

        assert!(!exec.exists(&mirror));
        exec.execute(Action::GitClone {
            url: "https://git.suckless.org/dwm".to_string(),
            path: mirror.clone(),
            branch: None,
        })
        .unwrap();

        assert!(exec.exists(&mirror));
        assert!(exec.exists(&mirror.join(".git")));
        assert!(!exec.exists(Path::new("/nonexistent/cache/mirrors/st")));
    }

    #[test]
    fn test_rename_hides_source_until_recreated() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let dest = temp.path().join(".zshrc");
        std::fs::write(&dest, "old").unwrap();
        let backup = temp.path().join(".zshrc.bak.20260101");
        let mut exec = DryRunExecutor::quiet();

        exec.execute(Action::Rename {
            from: dest.clone(),
            to: backup.clone(),
        })
        .unwrap();
        assert!(!exec.exists(&dest));
        assert!(exec.exists(&backup));

        exec.execute(Action::CopyFile {
            from: temp.path().join("src"),
            to: dest.clone(),
            mode: 0o644,
        })
        .unwrap();
        assert!(exec.exists(&dest));
    }

    #[test]
    fn test_created_directory_starts_empty() {
        let mut exec = DryRunExecutor::quiet();
        let dir = PathBuf::from("/nonexistent/home/.config/kitty");

        exec.execute(Action::CreateDir { path: dir.clone() }).unwrap();

        assert!(exec.exists(&dir));
        assert!(!exec.exists(&dir.join("kitty.conf")));
    }
}
