//! Copying files and directory trees out of mirrors into place

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::common::fs::same_contents;
use crate::error::Result;
use crate::exec::{Action, Executor};
use crate::ui::Reporter;

/// What [`deploy_file`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployed {
    /// Source missing, nothing done
    Skipped,
    /// Destination already identical
    UpToDate,
    /// Destination did not exist
    Installed,
    /// Differing destination moved to `backup` first
    Replaced { backup: PathBuf },
}

/// `<dest>.bak.<YYYYMMDD>`
pub fn backup_path(dest: &Path, date: &str) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(format!(".bak.{date}"));
    PathBuf::from(name)
}

fn today() -> String {
    Local::now().format("%Y%m%d").to_string()
}

fn ensure_parent(exec: &mut dyn Executor, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !exec.exists(parent) {
            exec.execute(Action::CreateDir {
                path: parent.to_path_buf(),
            })?;
        }
    }
    Ok(())
}

/// Install `source` at `dest` with `mode`
///
/// An identical destination is left alone. A differing one is renamed to a
/// dated backup before the copy.
pub fn deploy_file(
    exec: &mut dyn Executor,
    ui: &Reporter,
    source: &Path,
    dest: &Path,
    mode: u32,
) -> Result<Deployed> {
    if !exec.exists(source) {
        ui.skip(format!("{} (no source at {})", dest.display(), source.display()));
        return Ok(Deployed::Skipped);
    }

    let dest_exists = exec.exists(dest);
    if dest_exists && same_contents(source, dest) {
        ui.ok(format!("{} up to date", dest.display()));
        return Ok(Deployed::UpToDate);
    }

    ensure_parent(exec, dest)?;

    let backup = if dest_exists {
        let backup = backup_path(dest, &today());
        exec.execute(Action::Rename {
            from: dest.to_path_buf(),
            to: backup.clone(),
        })?;
        Some(backup)
    } else {
        None
    };

    exec.execute(Action::CopyFile {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        mode,
    })?;

    match backup {
        Some(backup) => {
            ui.ok(format!(
                "{} deployed (previous saved as {})",
                dest.display(),
                backup.display()
            ));
            Ok(Deployed::Replaced { backup })
        }
        None => {
            ui.ok(format!("{} deployed", dest.display()));
            Ok(Deployed::Installed)
        }
    }
}

/// Merge `source_dir` into `dest_dir`, skipping `.git`
///
/// Existing files are overwritten without backups.
pub fn deploy_tree(
    exec: &mut dyn Executor,
    ui: &Reporter,
    source_dir: &Path,
    dest_dir: &Path,
) -> Result<bool> {
    if !exec.exists(source_dir) {
        ui.skip(format!(
            "{} (no source at {})",
            dest_dir.display(),
            source_dir.display()
        ));
        return Ok(false);
    }

    exec.execute(Action::CopyTree {
        from: source_dir.to_path_buf(),
        to: dest_dir.to_path_buf(),
    })?;
    ui.ok(format!("{} merged", dest_dir.display()));
    Ok(true)
}
