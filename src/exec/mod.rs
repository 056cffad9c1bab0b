//! Mutation chokepoint
//!
//! Every state-changing step of a run is expressed as an [`Action`] and handed
//! to an [`Executor`]. The [`SystemExecutor`] performs actions; the
//! [`DryRunExecutor`] only describes them. Both keep a journal of action
//! descriptions, so a dry run and a real run over the same inputs can be
//! compared line by line.
//!
//! Reads (file contents, PATH lookups, repository probes) never go through
//! the executor. Existence checks do, via [`Executor::exists`], because a dry
//! run must answer them as if earlier skipped actions had happened.

mod dry_run;
mod system;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use dry_run::DryRunExecutor;
pub use system::SystemExecutor;

/// Mode for deployed data files
pub const MODE_DATA: u32 = 0o644;

/// Mode for deployed executables
pub const MODE_EXEC: u32 = 0o755;

/// External program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Run through `sudo`
    pub privileged: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            privileged: false,
        }
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Full command line as it would be typed, including `sudo`
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        if self.privileged {
            parts.push("sudo".to_string());
        }
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// A single state-changing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run(CommandSpec),
    CreateDir {
        path: PathBuf,
    },
    WriteFile {
        path: PathBuf,
        contents: String,
        mode: Option<u32>,
        privileged: bool,
    },
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        mode: u32,
    },
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    CopyTree {
        from: PathBuf,
        to: PathBuf,
    },
    GitClone {
        url: String,
        path: PathBuf,
        branch: Option<String>,
    },
    GitFetch {
        path: PathBuf,
    },
    GitSwitch {
        path: PathBuf,
        branch: String,
    },
    GitFastForward {
        path: PathBuf,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Run(cmd) => match &cmd.cwd {
                Some(dir) => write!(f, "run `{}` in {}", cmd.command_line(), dir.display()),
                None => write!(f, "run `{}`", cmd.command_line()),
            },
            Action::CreateDir { path } => write!(f, "create directory {}", path.display()),
            Action::WriteFile {
                path,
                mode,
                privileged,
                ..
            } => {
                write!(f, "write {}", path.display())?;
                match (mode, privileged) {
                    (Some(mode), true) => write!(f, " (mode {mode:04o}, as root)"),
                    (Some(mode), false) => write!(f, " (mode {mode:04o})"),
                    (None, true) => write!(f, " (as root)"),
                    (None, false) => Ok(()),
                }
            }
            Action::CopyFile { from, to, mode } => write!(
                f,
                "install {} -> {} (mode {:04o})",
                from.display(),
                to.display(),
                mode
            ),
            Action::Rename { from, to } => {
                write!(f, "move {} -> {}", from.display(), to.display())
            }
            Action::CopyTree { from, to } => {
                write!(f, "merge tree {} -> {}", from.display(), to.display())
            }
            Action::GitClone { url, path, branch } => match branch {
                Some(branch) => write!(
                    f,
                    "git clone {url} (branch {branch}) into {}",
                    path.display()
                ),
                None => write!(f, "git clone {url} into {}", path.display()),
            },
            Action::GitFetch { path } => write!(f, "git fetch all refs in {}", path.display()),
            Action::GitSwitch { path, branch } => {
                write!(f, "git switch {branch} in {}", path.display())
            }
            Action::GitFastForward { path } => {
                write!(f, "git fast-forward {}", path.display())
            }
        }
    }
}

/// Performs or previews actions
pub trait Executor {
    /// Perform `action`, or describe it in a dry run
    ///
    /// A dry run always succeeds. A real run propagates the failure.
    fn execute(&mut self, action: Action) -> Result<()>;

    /// Whether `path` exists, counting paths that skipped dry-run actions
    /// would have created
    fn exists(&self, path: &Path) -> bool;

    /// Descriptions of every action handed to this executor, in order
    fn journal(&self) -> &[String];
}
