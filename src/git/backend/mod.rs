// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery (read)      --> GixBackend (pure Rust gix)
//! GitMutation (write)  --> ShellBackend (git CLI)
//!
//! CommitGraph / BranchRefs  --> per-repository seams used by the rewrite
//!                               engine; implemented by git::Repo
//! ```

use crate::core::process::{ProcessBuilder, ProcessFlags};
use crate::error::{GitError, GixError, ProcessError, TgtError, TgtResult};
use crate::git::object::{Commit, CommitData};
use gix::ObjectId;
use std::path::Path;

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations.
///
/// Implementors provide methods to inspect repository state without modification.
pub trait GitQuery {
    /// Check if path is inside a git repository.
    fn is_git_repo(path: &Path) -> bool;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> TgtResult<Option<String>>;

    /// Check for uncommitted changes (staged, unstaged, or untracked files).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or status check fails.
    fn has_uncommitted_changes(path: &Path) -> TgtResult<bool>;
}

// --- Mutation Trait (Write operations) ---

/// Git mutation operations that modify repository state.
///
/// Object and reference writes go through the git CLI so that hooks, reflogs
/// and ref locking behave exactly as they do for the user's own git.
pub trait GitMutation {
    /// Store raw commit bytes as a commit object and return its id.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git rejects the object.
    fn write_commit_object(repo_path: &Path, bytes: &[u8]) -> TgtResult<ObjectId>;

    /// Move `refname` from `old` to `new`, failing if it no longer points at `old`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reference could not be locked or has moved.
    fn update_ref(
        repo_path: &Path,
        refname: &str,
        new: ObjectId,
        old: ObjectId,
        message: &str,
    ) -> TgtResult<()>;

    /// Force-push `branch` to the same branch name on `remote`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RemoteNotFound` for an unknown remote, or a
    /// `GitError` if the push is rejected.
    fn push_force(repo_path: &Path, remote: &str, branch: &str) -> TgtResult<()>;
}

// --- Per-repository seams ---

/// Read and write access to commit objects.
pub trait CommitGraph {
    /// Load a commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the object is missing or is not a commit.
    fn read_commit(&self, id: ObjectId) -> TgtResult<Commit>;

    /// Store a commit object and return its id.
    ///
    /// Writing identical content twice yields the same id.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the object cannot be stored.
    fn write_commit(&self, data: &CommitData) -> TgtResult<ObjectId>;

    /// Resolve a revision expression to a commit id, `None` if it does not resolve.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures other than "not found".
    fn resolve_revision(&self, rev: &str) -> TgtResult<Option<ObjectId>>;

    /// Best common ancestor of two commits, `None` if they share no history.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures other than "no common ancestor".
    fn merge_base(&self, one: ObjectId, two: ObjectId) -> TgtResult<Option<ObjectId>>;
}

/// Branch reference access.
pub trait BranchRefs {
    /// Current commit of `refs/heads/<branch>`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::BranchNotFound` if the branch does not exist.
    fn branch_tip(&self, branch: &str) -> TgtResult<ObjectId>;

    /// Point `branch` at `new` only if it still points at `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::ConcurrentModification` if the branch moved;
    /// the branch is left untouched in that case.
    fn compare_and_set(
        &self,
        branch: &str,
        expected: ObjectId,
        new: ObjectId,
        message: &str,
    ) -> TgtResult<()>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Provides read-only operations without spawning subprocesses.
pub struct GixBackend;

impl GixBackend {
    pub(crate) fn discover(path: &Path) -> TgtResult<gix::Repository> {
        gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))).into())
    }
}

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok()
    }

    fn current_branch(path: &Path) -> TgtResult<Option<String>> {
        let repo = Self::discover(path)?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn has_uncommitted_changes(path: &Path) -> TgtResult<bool> {
        use gix::status::UntrackedFiles;

        let repo = Self::discover(path)?;

        let has_changes = repo
            .status(gix::progress::Discard)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to prepare status check".to_string(),
            })?
            .untracked_files(UntrackedFiles::Files)
            .into_iter(None)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to check repository status".to_string(),
            })?
            .next()
            .is_some();

        Ok(has_changes)
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
///
/// Used for every write plus the few reads that must honor the user's full
/// git configuration (`git config`, `git verify-commit`).
pub struct ShellBackend;

impl ShellBackend {
    /// Git invocation with `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    fn git(args: &[&str], cwd: &Path) -> ProcessBuilder {
        ProcessBuilder::new("git")
            .args(args)
            .cwd(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .flag(ProcessFlags::TRIM_OUTPUT)
    }

    /// Execute a git command and return its trimmed stdout.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> TgtResult<String> {
        Self::finish(args, Self::git(args, cwd))
    }

    /// Execute a git command with `input` on stdin.
    pub(crate) fn git_command_with_stdin(
        args: &[&str],
        cwd: &Path,
        input: &[u8],
    ) -> TgtResult<String> {
        Self::finish(args, Self::git(args, cwd).stdin(input))
    }

    fn finish(args: &[&str], builder: ProcessBuilder) -> TgtResult<String> {
        match builder.run() {
            Ok(output) => Ok(output.into_stdout()),
            Err(TgtError::Process(err)) => match *err {
                ProcessError::NonZeroExit { stderr, .. } => Err(GitError::CommandFailed {
                    command: format!("git {}", args.join(" ")),
                    message: stderr,
                }
                .into()),
                other => Err(other.into()),
            },
            Err(other) => Err(other),
        }
    }

    /// Read a git config value; `None` when the key is unset.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails for a reason other than a missing key.
    pub fn config_value(repo_path: &Path, key: &str) -> TgtResult<Option<String>> {
        let output = Self::git(&["config", "--get", key], repo_path)
            .flag(ProcessFlags::ALLOW_FAILURE)
            .run()?;
        match output.exit_code() {
            0 if output.stdout().is_empty() => Ok(None),
            0 => Ok(Some(output.into_stdout())),
            // 1 = key not set
            1 => Ok(None),
            code => Err(GitError::CommandFailed {
                command: format!("git config --get {key}"),
                message: format!("exit code {code}: {}", output.stderr()),
            }
            .into()),
        }
    }

    /// Run `git verify-commit`; true when git accepts the signature.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if git cannot be started.
    pub fn verify_commit(repo_path: &Path, id: ObjectId) -> TgtResult<bool> {
        let id = id.to_string();
        let output = Self::git(&["verify-commit", &id], repo_path)
            .flag(ProcessFlags::ALLOW_FAILURE)
            .run()?;
        Ok(output.success())
    }
}

impl GitMutation for ShellBackend {
    fn write_commit_object(repo_path: &Path, bytes: &[u8]) -> TgtResult<ObjectId> {
        let args = ["hash-object", "-t", "commit", "-w", "--stdin"];
        let hex = Self::git_command_with_stdin(&args, repo_path, bytes)?;
        ObjectId::from_hex(hex.as_bytes()).map_err(|e| {
            GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: format!("unexpected object id '{hex}': {e}"),
            }
            .into()
        })
    }

    fn update_ref(
        repo_path: &Path,
        refname: &str,
        new: ObjectId,
        old: ObjectId,
        message: &str,
    ) -> TgtResult<()> {
        let new = new.to_string();
        let old = old.to_string();
        Self::git_command(&["update-ref", "-m", message, refname, &new, &old], repo_path)?;
        Ok(())
    }

    fn push_force(repo_path: &Path, remote: &str, branch: &str) -> TgtResult<()> {
        if Self::git_command(&["remote", "get-url", remote], repo_path).is_err() {
            return Err(GitError::RemoteNotFound {
                remote: remote.to_string(),
            }
            .into());
        }
        let refspec = format!("+refs/heads/{branch}:refs/heads/{branch}");
        Self::git_command(&["push", "--quiet", remote, &refspec], repo_path)?;
        Ok(())
    }
}
