//! Clone-if-absent, fetch-and-fast-forward-if-present

use std::path::PathBuf;

use crate::error::Result;
use crate::exec::{Action, Executor};
use crate::ui::Reporter;

/// Remote repository and its local working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub remote: String,
    pub local_path: PathBuf,
    pub branch: Option<String>,
}

impl SyncTarget {
    pub fn new(remote: &str, local_path: PathBuf, branch: Option<&str>) -> Self {
        Self {
            remote: remote.to_string(),
            local_path,
            branch: branch.map(str::to_string),
        }
    }

    fn name(&self) -> String {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.local_path.display().to_string())
    }
}

/// What a sync did to the local copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No local copy existed; a fresh clone was made
    Cloned,
    /// Existing copy fetched and fast-forwarded (or already current)
    Updated,
    /// Existing copy could not be fast-forwarded and was left as it was
    Stale,
}

/// Bring the local copy of `target` up to date
///
/// Fetch and clone failures are fatal. A branch that cannot be switched to,
/// or a local history that cannot be fast-forwarded, is a warning; the
/// existing tree is kept as it is.
pub fn sync_mirror(
    exec: &mut dyn Executor,
    ui: &Reporter,
    target: &SyncTarget,
) -> Result<SyncOutcome> {
    let path = &target.local_path;
    let name = target.name();

    if !exec.exists(&path.join(".git")) {
        if let Some(parent) = path.parent() {
            if !exec.exists(parent) {
                exec.execute(Action::CreateDir {
                    path: parent.to_path_buf(),
                })?;
            }
        }
        exec.execute(Action::GitClone {
            url: target.remote.clone(),
            path: path.clone(),
            branch: target.branch.clone(),
        })?;
        ui.ok(format!("{name}: cloned from {}", target.remote));
        return Ok(SyncOutcome::Cloned);
    }

    exec.execute(Action::GitFetch { path: path.clone() })?;

    if let Some(branch) = &target.branch {
        let switched = exec.execute(Action::GitSwitch {
            path: path.clone(),
            branch: branch.clone(),
        });
        if let Err(e) = switched {
            ui.warn(format!("{name}: staying on current branch ({e})"));
        }
    }

    match exec.execute(Action::GitFastForward { path: path.clone() }) {
        Ok(()) => {
            ui.ok(format!("{name}: up to date"));
            Ok(SyncOutcome::Updated)
        }
        Err(e) => {
            tracing::debug!(mirror = %path.display(), error = %e, "fast-forward refused");
            ui.warn(format!("{name}: keeping local copy ({e})"));
            Ok(SyncOutcome::Stale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{DryRunExecutor, SystemExecutor};
    use git2::{Oid, Repository, Signature};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str) -> Oid {
        fs::write(repo.workdir().unwrap().join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "update", &tree, &parents)
            .unwrap()
    }

    struct Fixture {
        _temp: TempDir,
        origin: Repository,
        target: SyncTarget,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let origin_path = temp.path().join("origin");
        let origin = Repository::init(&origin_path).unwrap();
        commit_file(&origin, "config.h", "v1\n");
        let target = SyncTarget::new(
            origin_path.to_str().unwrap(),
            temp.path().join("cache/mirrors/dwm"),
            None,
        );
        Fixture {
            _temp: temp,
            origin,
            target,
        }
    }

    #[test]
    fn test_first_sync_clones_second_updates() {
        let fx = fixture();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();

        assert_eq!(
            sync_mirror(&mut exec, &ui, &fx.target).unwrap(),
            SyncOutcome::Cloned
        );
        assert_eq!(
            sync_mirror(&mut exec, &ui, &fx.target).unwrap(),
            SyncOutcome::Updated
        );

        // Still exactly one working copy with the original content
        let mirror = &fx.target.local_path;
        assert_eq!(fs::read_to_string(mirror.join("config.h")).unwrap(), "v1\n");
        assert_eq!(ui.warnings(), 0);
    }

    #[test]
    fn test_sync_picks_up_upstream_commits() {
        let fx = fixture();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();
        sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        commit_file(&fx.origin, "config.h", "v2\n");
        let outcome = sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        assert_eq!(outcome, SyncOutcome::Updated);
        assert_eq!(
            fs::read_to_string(fx.target.local_path.join("config.h")).unwrap(),
            "v2\n"
        );
    }

    #[test]
    fn test_diverged_mirror_is_kept_with_warning() {
        let fx = fixture();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();
        sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        commit_file(&fx.origin, "config.h", "upstream\n");
        let local = Repository::open(&fx.target.local_path).unwrap();
        commit_file(&local, "config.h", "my patches\n");

        let outcome = sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        assert_eq!(outcome, SyncOutcome::Stale);
        assert_eq!(ui.warnings(), 1);
        assert_eq!(
            fs::read_to_string(fx.target.local_path.join("config.h")).unwrap(),
            "my patches\n"
        );
    }

    #[test]
    fn test_uncommitted_local_edit_is_kept_with_warning() {
        let fx = fixture();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();
        sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        let config = fx.target.local_path.join("config.h");
        fs::write(&config, "my local patch\n").unwrap();
        commit_file(&fx.origin, "config.h", "v2\n");

        let outcome = sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        assert_eq!(outcome, SyncOutcome::Stale);
        assert_eq!(ui.warnings(), 1);
        assert!(ui.lines().iter().any(|l| l.contains("keeping local copy")));
        assert_eq!(fs::read_to_string(&config).unwrap(), "my local patch\n");
    }

    #[test]
    fn test_missing_branch_is_a_warning() {
        let mut fx = fixture();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();
        sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        fx.target.branch = Some("no-such-branch".to_string());
        let outcome = sync_mirror(&mut exec, &ui, &fx.target).unwrap();

        assert_eq!(outcome, SyncOutcome::Updated);
        assert_eq!(ui.warnings(), 1);
        assert!(ui.lines().iter().any(|l| l.contains("staying on current branch")));
    }

    #[test]
    fn test_dry_run_journal_matches_real_run() {
        let fx = fixture();
        let ui = Reporter::buffered();

        let mut preview = DryRunExecutor::quiet();
        sync_mirror(&mut preview, &ui, &fx.target).unwrap();
        assert!(!fx.target.local_path.exists());

        let mut real = SystemExecutor::quiet();
        sync_mirror(&mut real, &ui, &fx.target).unwrap();

        assert_eq!(preview.journal(), real.journal());
        assert_eq!(preview.journal().len(), 2);
        assert!(preview.journal()[0].starts_with("create directory"));
        assert!(preview.journal()[1].starts_with("git clone"));
    }

    #[test]
    fn test_dry_run_sees_its_own_clone() {
        let fx = fixture();
        let ui = Reporter::buffered();
        let mut preview = DryRunExecutor::quiet();

        sync_mirror(&mut preview, &ui, &fx.target).unwrap();
        let outcome = sync_mirror(&mut preview, &ui, &fx.target).unwrap();

        assert_eq!(outcome, SyncOutcome::Updated);
        assert!(preview.journal()[2].starts_with("git fetch"));
    }
}
