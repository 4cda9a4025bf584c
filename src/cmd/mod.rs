// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   change-author, sign      open_branch --> rewrite_branch --> report
//!   options, config-files    print configuration
//! ```

pub mod change_author;
pub mod config;
pub mod sign;


use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::config::types::RewriteConfig;
use crate::error::{GitError, GixError, Result, TgtError, TgtResult};
use crate::git::Repo;
use crate::rewrite::RewriteOutcome;

/// Options shared by the rewriting commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Resolve and validate only.
    pub dry_run: bool,
    /// Print the report as JSON.
    pub json: bool,
}

/// Open the repository at `path` and run the pre-flight checks.
///
/// Returns the repository and the checked-out branch.
///
/// # Errors
///
/// Fails for a bare repository, a detached HEAD, or uncommitted changes
/// (unless `rewrite.allow_dirty` is set).
pub fn open_branch(path: &Path, rewrite: &RewriteConfig) -> Result<(Repo, String)> {
    let repo = Repo::discover(path)
        .with_context(|| format!("failed to open repository at {}", path.display()))?;
    if repo.is_bare() {
        return Err(TgtError::from(GitError::Gix(GixError::BareRepository)).into());
    }

    let branch = repo.current_branch()?.ok_or_else(|| {
        TgtError::from(GitError::DetachedHead {
            path: repo.path().display().to_string(),
        })
    })?;

    if rewrite.allow_dirty {
        info!(path = %repo.path().display(), "skipping worktree check");
    } else if repo.has_uncommitted_changes()? {
        return Err(TgtError::from(GitError::UncommittedChanges {
            path: repo.path().display().to_string(),
        })
        .into());
    }

    Ok((repo, branch))
}

/// Print the result of a rewrite.
///
/// An empty range is reported and turned into `Ok(None)`.
///
/// # Errors
///
/// Returns every rewrite error except `NoCommitsToRewrite`.
pub fn report(
    result: TgtResult<RewriteOutcome>,
    branch: &str,
    options: RunOptions,
) -> Result<Option<RewriteOutcome>> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_nothing_to_rewrite() => {
            if options.json {
                println!(
                    "{}",
                    serde_json::json!({ "branch": branch, "commits": 0, "rewritten": 0 })
                );
            } else {
                println!("nothing to rewrite on '{branch}'");
            }
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if options.json {
        let json = serde_json::to_string_pretty(&outcome.report())
            .context("failed to serialize rewrite report")?;
        println!("{json}");
    } else {
        println!("{outcome}");
    }
    Ok(Some(outcome))
}
