// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! An opened repository.
//!
//! ```text
//! Repo
//!  ├─ gix::Repository ──> read_commit / resolve_revision / merge_base / branch_tip
//!  └─ path ──> git CLI ──> write_commit / compare_and_set / push / config
//! ```

use std::path::{Path, PathBuf};

use gix::ObjectId;
use tracing::{debug, warn};

use super::backend::{BranchRefs, CommitGraph, GixBackend};
use super::object::{Commit, CommitData, short_hex};
use super::{cmd, query};
use crate::error::{GitError, GixError, RewriteError, TgtResult};

/// A discovered git repository.
pub struct Repo {
    /// Directory git commands run in: the worktree, or the git dir when bare.
    path: PathBuf,
    inner: gix::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Repo {
    /// Discover the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepoNotFound` if `path` is not inside a repository.
    pub fn discover(path: &Path) -> TgtResult<Self> {
        if !query::is_git_repo(path) {
            return Err(GitError::RepoNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let inner = GixBackend::discover(path)?;
        let path = inner
            .workdir()
            .unwrap_or_else(|| inner.git_dir())
            .to_path_buf();
        debug!(path = %path.display(), "opened repository");
        Ok(Self { path, inner })
    }

    /// Directory git commands run in.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True for a repository without a worktree.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.inner.workdir().is_none()
    }

    /// Branch HEAD points at, `None` when detached.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if HEAD cannot be read.
    pub fn current_branch(&self) -> TgtResult<Option<String>> {
        query::current_branch(&self.path)
    }

    /// True if the worktree or index differs from HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status check fails, or `GixError::BareRepository`.
    pub fn has_uncommitted_changes(&self) -> TgtResult<bool> {
        if self.is_bare() {
            return Err(GitError::Gix(GixError::BareRepository).into());
        }
        query::has_uncommitted_changes(&self.path)
    }

    /// Read a git config value with the user's full configuration applied.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails for a reason other than an unset key.
    pub fn config_value(&self, key: &str) -> TgtResult<Option<String>> {
        cmd::config_value(&self.path, key)
    }

    /// Check a commit signature with `git verify-commit`.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if git cannot be started.
    pub fn verify_commit(&self, id: ObjectId) -> TgtResult<bool> {
        cmd::verify_commit(&self.path, id)
    }

    /// Force-push `branch` to `remote`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote is unknown or rejects the push.
    pub fn push_force(&self, remote: &str, branch: &str) -> TgtResult<()> {
        cmd::push_force(&self.path, remote, branch)
    }

    fn read_branch(&self, branch: &str) -> Option<ObjectId> {
        let refname = format!("refs/heads/{branch}");
        self.inner
            .rev_parse_single(refname.as_str())
            .ok()
            .map(gix::Id::detach)
    }
}

impl CommitGraph for Repo {
    fn read_commit(&self, id: ObjectId) -> TgtResult<Commit> {
        let commit = self
            .inner
            .find_commit(id)
            .map_err(|e| GitError::Gix(GixError::FindObject {
                id,
                message: e.to_string(),
            }))?;
        let decode_error = |e: gix::objs::decode::Error| {
            GitError::Gix(GixError::DecodeCommit {
                id,
                message: e.to_string(),
            })
        };
        let decoded = commit.decode().map_err(decode_error)?;
        let data = CommitData::from_commit_ref(&decoded).map_err(decode_error)?;
        Ok(Commit { id, data })
    }

    fn write_commit(&self, data: &CommitData) -> TgtResult<ObjectId> {
        cmd::write_commit_object(&self.path, &data.to_bytes())
    }

    fn resolve_revision(&self, rev: &str) -> TgtResult<Option<ObjectId>> {
        let peeled = format!("{rev}^{{commit}}");
        match self.inner.rev_parse_single(peeled.as_str()) {
            Ok(id) => Ok(Some(id.detach())),
            Err(e) => {
                debug!(revision = rev, error = %e, "revision does not resolve");
                Ok(None)
            }
        }
    }

    fn merge_base(&self, one: ObjectId, two: ObjectId) -> TgtResult<Option<ObjectId>> {
        match self.inner.merge_base(one, two) {
            Ok(id) => Ok(Some(id.detach())),
            Err(e) => {
                debug!(one = %one, two = %two, error = %e, "no merge base");
                Ok(None)
            }
        }
    }
}

impl BranchRefs for Repo {
    fn branch_tip(&self, branch: &str) -> TgtResult<ObjectId> {
        self.read_branch(branch).ok_or_else(|| {
            GitError::BranchNotFound {
                branch: branch.to_string(),
            }
            .into()
        })
    }

    fn compare_and_set(
        &self,
        branch: &str,
        expected: ObjectId,
        new: ObjectId,
        message: &str,
    ) -> TgtResult<()> {
        let moved = |actual: Option<ObjectId>| RewriteError::ConcurrentModification {
            branch: branch.to_string(),
            expected,
            actual: actual.map_or_else(|| "<deleted>".to_string(), |id| id.to_string()),
        };

        let current = self.read_branch(branch);
        if current != Some(expected) {
            return Err(moved(current).into());
        }
        if new == expected {
            debug!(branch, "branch already at target");
            return Ok(());
        }

        let refname = format!("refs/heads/{branch}");
        match cmd::update_ref(&self.path, &refname, new, expected, message) {
            Ok(()) => {
                debug!(
                    branch,
                    from = %short_hex(&expected),
                    to = %short_hex(&new),
                    "branch updated"
                );
                Ok(())
            }
            Err(err) => {
                let actual = self.read_branch(branch);
                if actual == Some(expected) {
                    Err(err)
                } else {
                    warn!(branch, "branch moved during update");
                    Err(moved(actual).into())
                }
            }
        }
    }
}
