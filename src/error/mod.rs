// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              TgtError (16 bytes)
//!                     |
//!     +---------+---------+---------+---------+
//!     |         |         |         |         |
//!     v         v         v         v         v
//!    Git     Rewrite    Config   Process      Io
//!    Box       Box       Box       Box       Box
//!
//! Sub-errors (unboxed internally):
//!   Git      Gix, CommandFailed, DetachedHead, UncommittedChanges
//!   Rewrite  NoCommitsToRewrite, BoundaryNotFound, NonLinearHistory,
//!            SigningUnavailable, ConcurrentModification, MalformedCommit
//!   Config   ParseError, MissingKey, InvalidValue
//!   Process  ExecutableNotFound, SpawnFailed, NonZeroExit
//!
//! All variants boxed => TgtError fits in 16 bytes.
//! ```

use gix::ObjectId;
use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`TgtError`].
pub type TgtResult<T> = std::result::Result<T, TgtError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at 16 bytes on the stack.
#[derive(Debug, Error)]
pub enum TgtError {
    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// History rewrite failed.
    #[error("rewrite error: {0}")]
    Rewrite(#[from] Box<RewriteError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

impl TgtError {
    /// The rewrite error behind this error, if any.
    #[must_use]
    pub fn as_rewrite(&self) -> Option<&RewriteError> {
        match self {
            Self::Rewrite(err) => Some(err),
            _ => None,
        }
    }

    /// True for the "range is empty" outcome, which callers treat as a no-op.
    #[must_use]
    pub fn is_nothing_to_rewrite(&self) -> bool {
        matches!(
            self.as_rewrite(),
            Some(RewriteError::NoCommitsToRewrite { .. })
        )
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for TgtError {
                fn from(err: $error) -> Self {
                    TgtError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    RewriteError => Rewrite,
    ConfigError => Config,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has multiple error types that are converted through this enum.
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),

    /// Failed to look up an object.
    #[error("failed to read object {id}: {message}")]
    FindObject { id: ObjectId, message: String },

    /// Failed to decode a commit object.
    #[error("failed to decode commit {id}: {message}")]
    DecodeCommit { id: ObjectId, message: String },

    /// Repository has no worktree (bare repository).
    #[error("repository has no worktree (bare repository)")]
    BareRepository,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Uncommitted changes detected when clean working tree required.
    #[error("uncommitted changes in {path}; commit or stash them first")]
    UncommittedChanges { path: String },

    /// HEAD does not point at a branch.
    #[error("detached HEAD is not supported in {path}")]
    DetachedHead { path: String },

    /// Branch not found.
    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// Remote not found.
    #[error("remote not found: {remote}")]
    RemoteNotFound { remote: String },
}

// --- Rewrite Errors ---

/// Failures of the linear history rewrite.
///
/// Every variant leaves the branch reference where it was.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The range between boundary and tip is empty.
    #[error("no commits to rewrite on '{branch}'")]
    NoCommitsToRewrite { branch: String },

    /// The boundary reference does not resolve or shares no history with the tip.
    #[error("boundary '{reference}' not found: {reason}")]
    BoundaryNotFound { reference: String, reason: String },

    /// A merge commit was found inside the range.
    #[error(
        "commit {commit} has {parents} parents; rewriting merge commits is not supported \
         (linearize the history first, e.g. with an interactive rebase)"
    )]
    NonLinearHistory { commit: ObjectId, parents: usize },

    /// Signing key or signing program is missing or refused to sign.
    #[error("signing unavailable: {reason}")]
    SigningUnavailable { reason: String },

    /// The branch moved between reading the tip and updating it.
    #[error("branch '{branch}' moved from {expected} to {actual}; nothing was changed, retry")]
    ConcurrentModification {
        branch: String,
        expected: ObjectId,
        actual: String,
    },

    /// A commit object could not be interpreted.
    #[error("malformed commit {commit}: {message}")]
    MalformedCommit { commit: String, message: String },
}

impl RewriteError {
    /// Shorthand for a [`RewriteError::SigningUnavailable`] with the given reason.
    pub fn signing_unavailable(reason: impl Into<String>) -> Self {
        Self::SigningUnavailable {
            reason: reason.into(),
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Failed to feed or read process streams.
    #[error("failed to exchange data with process '{command}': {message}")]
    OutputError { command: String, message: String },
}
