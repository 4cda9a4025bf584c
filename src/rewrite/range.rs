// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Range resolution and linearity validation.
//!
//! ```text
//! tip ──first parent──> ... ──> boundary (exclusive) ──> ...
//! |<-------- range, stored oldest-first -------->|
//!
//! Boundary::Root            walk to the root commit
//! Boundary::MergeBase(rev)  stop at merge-base(tip, rev)
//! Boundary::SignedAncestor  stop at the first already-signed commit
//! ```
//!
//! The walk also stops right after the first merge commit so that the
//! validator can report it.

use gix::ObjectId;
use tracing::{debug, trace};

use crate::error::{RewriteError, TgtResult};
use crate::git::object::short_hex;
use crate::git::{Commit, CommitGraph};
use crate::signing::{HeaderPresence, SignatureCheck};

/// Where a rewrite range ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Everything back to the root commit.
    #[default]
    Root,
    /// Everything after the merge-base with the named revision.
    MergeBase(String),
    /// Everything after the most recent commit that is already signed.
    SignedAncestor,
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::MergeBase(rev) => write!(f, "merge-base with {rev}"),
            Self::SignedAncestor => write!(f, "last signed commit"),
        }
    }
}

/// Commits strictly after the boundary up to and including the tip.
#[derive(Debug, Clone)]
pub struct CommitRange {
    /// Branch the range was resolved on.
    pub branch: String,
    /// Boundary commit; `None` when the range starts at a root commit.
    pub boundary: Option<ObjectId>,
    /// Oldest first.
    pub commits: Vec<Commit>,
}

impl CommitRange {
    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Newest commit of the range.
    #[must_use]
    pub fn tip(&self) -> Option<&Commit> {
        self.commits.last()
    }
}

/// Collect the commits between `boundary` and `tip`.
///
/// `check` decides what "signed" means for [`Boundary::SignedAncestor`];
/// header presence is used when it is `None`.
///
/// # Errors
///
/// - `RewriteError::BoundaryNotFound` if a named boundary does not resolve,
///   shares no history with the tip, or is not on its first-parent chain.
/// - `RewriteError::NoCommitsToRewrite` if the range is empty.
pub fn resolve_range<G>(
    graph: &G,
    branch: &str,
    tip: ObjectId,
    boundary: &Boundary,
    check: Option<&dyn SignatureCheck>,
) -> TgtResult<CommitRange>
where
    G: CommitGraph + ?Sized,
{
    let stop = match boundary {
        Boundary::Root | Boundary::SignedAncestor => None,
        Boundary::MergeBase(rev) => {
            let other = graph
                .resolve_revision(rev)?
                .ok_or_else(|| RewriteError::BoundaryNotFound {
                    reference: rev.clone(),
                    reason: "revision does not resolve to a commit".to_string(),
                })?;
            let base = graph
                .merge_base(tip, other)?
                .ok_or_else(|| RewriteError::BoundaryNotFound {
                    reference: rev.clone(),
                    reason: format!("no common ancestor with '{branch}'"),
                })?;
            Some(base)
        }
    };
    let check = check.unwrap_or(&HeaderPresence);
    let stop_at_signed = matches!(boundary, Boundary::SignedAncestor);

    let mut commits = Vec::new();
    let mut found = None;
    let mut hit_merge = false;
    let mut cursor = Some(tip);

    while let Some(id) = cursor {
        if stop == Some(id) {
            found = Some(id);
            break;
        }
        let commit = graph.read_commit(id)?;
        if stop_at_signed && check.is_signed(&commit)? {
            trace!(commit = %short_hex(&id), "reached signed ancestor");
            found = Some(id);
            break;
        }
        cursor = commit.first_parent();
        hit_merge = commit.parent_count() > 1;
        commits.push(commit);
        if hit_merge {
            break;
        }
    }

    if let (Some(expected), None, false) = (stop, found, hit_merge) {
        return Err(RewriteError::BoundaryNotFound {
            reference: expected.to_string(),
            reason: format!("not on the first-parent history of '{branch}'"),
        }
        .into());
    }
    if commits.is_empty() {
        return Err(RewriteError::NoCommitsToRewrite {
            branch: branch.to_string(),
        }
        .into());
    }

    commits.reverse();
    let range = CommitRange {
        branch: branch.to_string(),
        boundary: found.or(stop),
        commits,
    };
    debug!(
        branch,
        commits = range.len(),
        boundary = %range.boundary.as_ref().map_or_else(|| "root".to_string(), short_hex),
        "resolved range"
    );
    Ok(range)
}

/// Reject ranges that contain a merge commit.
///
/// Scans oldest-first and reports the first offender.
///
/// # Errors
///
/// Returns `RewriteError::NonLinearHistory` naming the merge commit.
pub fn validate_linear(range: &CommitRange) -> TgtResult<()> {
    match range.commits.iter().find(|c| c.parent_count() > 1) {
        Some(merge) => Err(RewriteError::NonLinearHistory {
            commit: merge.id,
            parents: merge.parent_count(),
        }
        .into()),
        None => Ok(()),
    }
}
