//! Mirror cloning
//!
//! Mirrors are full clones: later runs fetch every branch and fast-forward,
//! which a shallow history cannot do reliably.

use std::borrow::Cow;
use std::path::Path;

use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use crate::error::{DeskforgeError, Result};

/// Rewrite SCP-style `git@host:path` URLs to `ssh://git@host/path`
///
/// libgit2 handles the explicit form more reliably.
pub(super) fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }
    match url.split_once(':') {
        Some((host, path)) => {
            let path = path.strip_prefix('/').unwrap_or(path);
            Cow::Owned(format!("ssh://{host}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Clone `url` into `target`, checking out `branch` when given
pub fn clone(url: &str, target: &Path, branch: Option<&str>) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = branch {
        builder.branch(branch);
    }

    let url_to_clone = normalize_ssh_url(url);
    tracing::debug!(url = %url_to_clone, target = %target.display(), "cloning");
    builder
        .clone(url_to_clone.as_ref(), target)
        .map_err(|e| DeskforgeError::GitCloneFailed {
            url: url.to_string(),
            reason: interpret_git_error(&e),
        })
}
