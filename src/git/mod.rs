//! Git operations behind source mirrors
//!
//! A mirror is a full clone under the cache directory. Refreshing one means
//! fetching every branch from `origin`, switching to the configured branch,
//! and fast-forwarding it. Nothing here ever merges or rewrites local
//! history: a branch that cannot fast-forward is reported and left alone.
//!
//! Authentication is delegated to git's own mechanisms (SSH agent, keys in
//! `~/.ssh/`, credential helpers).

mod auth;
mod clone;
mod error;

use std::path::Path;

use git2::{
    AutotagOption, BranchType, FetchOptions, ObjectType, RemoteCallbacks, Repository, Status,
    StatusOptions, build::CheckoutBuilder,
};

pub use clone::clone;
pub use error::interpret_git_error;

use auth::setup_auth_callbacks;

use crate::error::{DeskforgeError, Result};

const REMOTE: &str = "origin";

/// Every remote branch, force-updated into its remote-tracking ref
const ALL_BRANCHES_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Open an existing repository
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| DeskforgeError::GitOpenFailed {
        path: path.display().to_string(),
        reason: e.message().to_string(),
    })
}

/// Name of the checked-out branch, `None` when HEAD is detached or unborn
pub fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(str::to_string)
}

/// Fetch all branches and tags from `origin`
pub fn fetch_all(path: &Path) -> Result<()> {
    let fetch_failed = |reason: String| DeskforgeError::GitFetchFailed {
        path: path.display().to_string(),
        reason,
    };

    let repo = open(path)?;
    let mut remote = repo
        .find_remote(REMOTE)
        .map_err(|e| fetch_failed(interpret_git_error(&e)))?;

    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options.download_tags(AutotagOption::All);

    remote
        .fetch(&[ALL_BRANCHES_REFSPEC], Some(&mut options), None)
        .map_err(|e| fetch_failed(interpret_git_error(&e)))
}

/// Check out `branch`, creating it from `origin/<branch>` when it only
/// exists on the remote
pub fn switch_branch(path: &Path, branch: &str) -> Result<()> {
    let switch_failed = |reason: String| DeskforgeError::GitCheckoutFailed {
        path: path.display().to_string(),
        branch: branch.to_string(),
        reason,
    };

    let repo = open(path)?;
    if current_branch(&repo).as_deref() == Some(branch) {
        return Ok(());
    }

    let local = match repo.find_branch(branch, BranchType::Local) {
        Ok(local) => local,
        Err(_) => {
            let tracking = format!("{REMOTE}/{branch}");
            let remote_branch = repo
                .find_branch(&tracking, BranchType::Remote)
                .map_err(|_| switch_failed(format!("no branch '{branch}' on {REMOTE}")))?;
            let commit = remote_branch
                .get()
                .peel_to_commit()
                .map_err(|e| switch_failed(e.message().to_string()))?;
            let mut created = repo
                .branch(branch, &commit, false)
                .map_err(|e| switch_failed(e.message().to_string()))?;
            created
                .set_upstream(Some(&tracking))
                .map_err(|e| switch_failed(e.message().to_string()))?;
            created
        }
    };

    let refname = local
        .get()
        .name()
        .ok_or_else(|| switch_failed("branch name is not valid UTF-8".to_string()))?
        .to_string();
    let target = local
        .get()
        .peel(ObjectType::Commit)
        .map_err(|e| switch_failed(e.message().to_string()))?;

    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
        .map_err(|e| switch_failed(e.message().to_string()))?;
    repo.set_head(&refname)
        .map_err(|e| switch_failed(e.message().to_string()))
}

/// Fast-forward the checked-out branch to its `origin` counterpart
///
/// Succeeds without changes when already up to date. Fails when the branch
/// has diverged or tracked files carry uncommitted changes, leaving the
/// working tree untouched.
pub fn fast_forward(path: &Path) -> Result<()> {
    let ff_failed = |reason: String| DeskforgeError::GitFastForwardFailed {
        path: path.display().to_string(),
        reason,
    };

    let repo = open(path)?;
    let branch =
        current_branch(&repo).ok_or_else(|| ff_failed("HEAD is not on a branch".to_string()))?;

    let upstream = repo
        .find_reference(&format!("refs/remotes/{REMOTE}/{branch}"))
        .map_err(|_| ff_failed(format!("no upstream {REMOTE}/{branch}")))?;
    let incoming = repo
        .reference_to_annotated_commit(&upstream)
        .map_err(|e| ff_failed(e.message().to_string()))?;

    let (analysis, _) = repo
        .merge_analysis(&[&incoming])
        .map_err(|e| ff_failed(e.message().to_string()))?;
    if analysis.is_up_to_date() {
        tracing::debug!(path = %path.display(), %branch, "already up to date");
        return Ok(());
    }
    if !analysis.is_fast_forward() {
        return Err(ff_failed(format!(
            "'{branch}' has diverged from {REMOTE}/{branch}"
        )));
    }

    let modified =
        modified_tracked_files(&repo).map_err(|e| ff_failed(e.message().to_string()))?;
    if !modified.is_empty() {
        return Err(ff_failed(format!(
            "uncommitted changes to {}",
            modified.join(", ")
        )));
    }

    // Working tree first, so a refused checkout leaves the branch where it was
    let target = repo
        .find_object(incoming.id(), Some(ObjectType::Commit))
        .map_err(|e| ff_failed(e.message().to_string()))?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
        .map_err(|e| ff_failed(format!("checkout refused: {}", e.message())))?;

    let refname = format!("refs/heads/{branch}");
    let mut local = repo
        .find_reference(&refname)
        .map_err(|e| ff_failed(e.message().to_string()))?;
    local
        .set_target(incoming.id(), "deskforge: fast-forward")
        .map_err(|e| ff_failed(e.message().to_string()))?;
    repo.set_head(&refname)
        .map_err(|e| ff_failed(e.message().to_string()))
}

/// Tracked paths with staged or unstaged changes
fn modified_tracked_files(repo: &Repository) -> std::result::Result<Vec<String>, git2::Error> {
    let mut options = StatusOptions::new();
    options.include_untracked(false).include_ignored(false);
    let statuses = repo.statuses(Some(&mut options))?;
    Ok(statuses
        .iter()
        .filter(|entry| entry.status() != Status::CURRENT)
        .filter_map(|entry| entry.path().map(str::to_string))
        .collect())
}
