// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command operations using shell backend.
//!
//! ```text
//! cmd.rs --> ShellBackend --> git (objects, refs, push, config)
//! ```

use crate::error::TgtResult;
use gix::ObjectId;
use std::path::Path;

use super::backend::{GitMutation, ShellBackend};

/// Store raw commit bytes and return the new object id.
///
/// # Errors
///
/// Returns a `GitError` if git rejects the object.
pub fn write_commit_object(repo_path: &Path, bytes: &[u8]) -> TgtResult<ObjectId> {
    ShellBackend::write_commit_object(repo_path, bytes)
}

/// Compare-and-swap update of a reference.
///
/// # Errors
///
/// Returns a `GitError` if the reference moved or could not be locked.
pub fn update_ref(
    repo_path: &Path,
    refname: &str,
    new: ObjectId,
    old: ObjectId,
    message: &str,
) -> TgtResult<()> {
    ShellBackend::update_ref(repo_path, refname, new, old, message)
}

/// Force-push a branch to the same name on `remote`.
///
/// # Errors
///
/// Returns a `GitError` if the remote is unknown or rejects the push.
pub fn push_force(repo_path: &Path, remote: &str, branch: &str) -> TgtResult<()> {
    ShellBackend::push_force(repo_path, remote, branch)
}

/// Read a git config value (`git config --get`).
///
/// # Errors
///
/// Returns a `GitError` if git fails for a reason other than an unset key.
pub fn config_value(repo_path: &Path, key: &str) -> TgtResult<Option<String>> {
    ShellBackend::config_value(repo_path, key)
}

/// Check a commit signature with `git verify-commit`.
///
/// # Errors
///
/// Returns a `ProcessError` if git cannot be started.
pub fn verify_commit(repo_path: &Path, id: ObjectId) -> TgtResult<bool> {
    ShellBackend::verify_commit(repo_path, id)
}
