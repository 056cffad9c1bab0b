//! Real executor: performs every action and propagates failures

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use console::Style;

use super::{Action, CommandSpec, Executor, MODE_DATA};
use crate::common::fs::{CopyOptions, copy_dir_recursive};
use crate::error::{DeskforgeError, Result};
use crate::git;

fn file_write_error(path: &Path, e: std::io::Error) -> DeskforgeError {
    DeskforgeError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| file_write_error(parent, e))?;
    }
    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| file_write_error(path, e))
}

/// Executor for real runs
#[derive(Debug, Default)]
pub struct SystemExecutor {
    journal: Vec<String>,
    echo: bool,
}

impl SystemExecutor {
    /// Executor printing each action before performing it
    pub fn new() -> Self {
        Self {
            journal: Vec::new(),
            echo: true,
        }
    }

    /// Executor that performs without printing
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self::default()
    }

    fn run(&self, cmd: &CommandSpec) -> Result<()> {
        let line = cmd.command_line();
        let mut command = if cmd.privileged {
            let mut sudo = Command::new("sudo");
            sudo.arg(&cmd.program);
            sudo
        } else {
            Command::new(&cmd.program)
        };
        command.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .map_err(|e| DeskforgeError::CommandSpawnFailed {
                command: line.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DeskforgeError::CommandFailed {
                command: line,
                status: status.to_string(),
            })
        }
    }

    /// Stage the contents in a temp file and move it into place with `sudo install`
    fn write_privileged(&self, path: &Path, contents: &str, mode: u32) -> Result<()> {
        let mut staged = tempfile::NamedTempFile::new().map_err(|e| file_write_error(path, e))?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|e| file_write_error(path, e))?;

        let staged_path = staged.path().display().to_string();
        let install = CommandSpec::new(
            "install",
            [
                "-D".to_string(),
                "-m".to_string(),
                format!("{mode:04o}"),
                staged_path,
                path.display().to_string(),
            ],
        )
        .privileged();
        self.run(&install)
    }

    fn perform(&self, action: &Action) -> Result<()> {
        match action {
            Action::Run(cmd) => self.run(cmd),
            Action::CreateDir { path } => {
                fs::create_dir_all(path).map_err(|e| file_write_error(path, e))
            }
            Action::WriteFile {
                path,
                contents,
                mode,
                privileged,
            } => {
                if *privileged {
                    return self.write_privileged(path, contents, mode.unwrap_or(MODE_DATA));
                }
                ensure_parent_dir(path)?;
                fs::write(path, contents).map_err(|e| file_write_error(path, e))?;
                match mode {
                    Some(mode) => set_mode(path, *mode),
                    None => Ok(()),
                }
            }
            Action::CopyFile { from, to, mode } => {
                ensure_parent_dir(to)?;
                fs::copy(from, to).map_err(|e| file_write_error(to, e))?;
                set_mode(to, *mode)
            }
            Action::Rename { from, to } => {
                fs::rename(from, to).map_err(|e| file_write_error(to, e))
            }
            Action::CopyTree { from, to } => {
                copy_dir_recursive(from, to, CopyOptions::exclude_git())
                    .map_err(|e| file_write_error(to, e))
            }
            Action::GitClone { url, path, branch } => {
                ensure_parent_dir(path)?;
                git::clone(url, path, branch.as_deref()).map(|_| ())
            }
            Action::GitFetch { path } => git::fetch_all(path),
            Action::GitSwitch { path, branch } => git::switch_branch(path, branch),
            Action::GitFastForward { path } => git::fast_forward(path),
        }
    }
}

impl Executor for SystemExecutor {
    fn execute(&mut self, action: Action) -> Result<()> {
        let description = action.to_string();
        if self.echo {
            println!("{} {}", Style::new().dim().apply_to("  →"), description);
        }
        tracing::debug!(action = %description, "executing");
        self.journal.push(description);
        self.perform(&action)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn journal(&self) -> &[String] {
        &self.journal
    }
}
