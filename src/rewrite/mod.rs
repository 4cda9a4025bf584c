// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Linear history rewrite engine.
//!
//! ```text
//! branch tip
//!     |
//!     v
//! resolve_range ──> validate_linear ──> rewrite_commits ──> update_branch
//!  (range.rs)        (range.rs)          (this module)       (refs.rs)
//!                                            |
//!                        per commit, oldest first:
//!                          already signed and parent unchanged? keep it
//!                          otherwise Transform::apply + write_commit
//!                          current_parent := new id
//! ```
//!
//! Nothing before `update_branch` is visible through any reference; objects
//! written by an aborted run stay unreachable until git collects them.

pub mod range;
pub mod refs;
pub mod transform;

#[cfg(test)]
mod tests;

use bon::Builder;
use gix::ObjectId;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RewriteError, TgtResult};
use crate::git::object::short_hex;
use crate::git::{BranchRefs, CommitGraph};
use crate::signing::SignatureCheck;

pub use range::{Boundary, CommitRange, resolve_range, validate_linear};
pub use refs::update_branch;
pub use transform::{CommitterPolicy, NewIdentity, Transform};

/// One rewrite of one branch.
#[derive(Builder)]
pub struct RewriteRequest<'a> {
    /// Short branch name, e.g. `main`.
    #[builder(into)]
    branch: String,
    #[builder(setters(name = with_boundary), default)]
    boundary: Boundary,
    transform: Transform<'a>,
    /// Commits passing this check keep their id when their parent is unchanged.
    #[builder(setters(name = with_skip_signed))]
    skip_signed: Option<&'a dyn SignatureCheck>,
    /// Resolve and validate only.
    #[builder(setters(name = with_dry_run), default = false)]
    dry_run: bool,
}

impl RewriteRequest<'_> {
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    #[must_use]
    pub const fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Original id to new id, in processing order.
///
/// Grows only by appending; passed-through commits map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteMapping {
    entries: Vec<(ObjectId, ObjectId)>,
}

impl RewriteMapping {
    pub fn record(&mut self, original: ObjectId, rewritten: ObjectId) {
        self.entries.push((original, rewritten));
    }

    /// New id for `original`, if it was processed.
    #[must_use]
    pub fn get(&self, original: ObjectId) -> Option<ObjectId> {
        self.entries
            .iter()
            .find(|(old, _)| *old == original)
            .map(|(_, new)| *new)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, ObjectId)> + '_ {
        self.entries.iter().copied()
    }

    /// Entries whose id changed.
    #[must_use]
    pub fn rewritten_count(&self) -> usize {
        self.entries.iter().filter(|(old, new)| old != new).count()
    }

    /// Entries kept as they were.
    #[must_use]
    pub fn passed_through_count(&self) -> usize {
        self.entries.len() - self.rewritten_count()
    }
}

/// Result of a successful rewrite (or dry run).
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub branch: String,
    pub old_tip: ObjectId,
    /// Equal to `old_tip` for a dry run or when every commit passed through.
    pub new_tip: ObjectId,
    pub boundary: Option<ObjectId>,
    /// Number of commits in the resolved range.
    pub range_len: usize,
    pub mapping: RewriteMapping,
    pub dry_run: bool,
}

impl RewriteOutcome {
    /// True if the branch was moved.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.old_tip != self.new_tip
    }

    /// Serializable summary.
    #[must_use]
    pub fn report(&self) -> RewriteReport {
        RewriteReport {
            branch: self.branch.clone(),
            old_tip: self.old_tip.to_string(),
            new_tip: self.new_tip.to_string(),
            boundary: self.boundary.map(|b| b.to_string()),
            commits: self.range_len,
            rewritten: self.mapping.rewritten_count(),
            passed_through: self.mapping.passed_through_count(),
            dry_run: self.dry_run,
            mapping: self
                .mapping
                .iter()
                .map(|(old, new)| MappingEntry {
                    old: old.to_string(),
                    new: new.to_string(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for RewriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dry_run {
            return write!(
                f,
                "{}: would rewrite {} commit(s) above {}",
                self.branch,
                self.range_len,
                self.boundary
                    .as_ref()
                    .map_or_else(|| "the root".to_string(), short_hex)
            );
        }
        write!(
            f,
            "{}: {} -> {} ({} rewritten, {} passed through)",
            self.branch,
            short_hex(&self.old_tip),
            short_hex(&self.new_tip),
            self.mapping.rewritten_count(),
            self.mapping.passed_through_count()
        )
    }
}

/// JSON form of a [`RewriteOutcome`].
#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub branch: String,
    pub old_tip: String,
    pub new_tip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<String>,
    pub commits: usize,
    pub rewritten: usize,
    pub passed_through: usize,
    pub dry_run: bool,
    pub mapping: Vec<MappingEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingEntry {
    pub old: String,
    pub new: String,
}

/// Apply `transform` to every commit of `range`, oldest first.
///
/// Returns the new tip and the mapping. Stops at the first failure; the
/// partial mapping is dropped with it.
///
/// # Errors
///
/// Propagates transform, signature check and object write failures.
pub fn rewrite_commits<G>(
    graph: &G,
    range: &CommitRange,
    transform: &Transform<'_>,
    skip_signed: Option<&dyn SignatureCheck>,
) -> TgtResult<(ObjectId, RewriteMapping)>
where
    G: CommitGraph + ?Sized,
{
    let mut current_parent = range.boundary;
    let mut mapping = RewriteMapping::default();

    for commit in &range.commits {
        if let Some(check) = skip_signed
            && commit.first_parent() == current_parent
            && check.is_signed(commit)?
        {
            debug!(commit = %commit.short_id(), "already signed, kept");
            mapping.record(commit.id, commit.id);
            current_parent = Some(commit.id);
            continue;
        }

        let data = transform.apply(commit, current_parent)?;
        let new_id = graph.write_commit(&data)?;
        debug!(
            old = %commit.short_id(),
            new = %short_hex(&new_id),
            summary = %commit.data.summary(),
            "rewrote commit"
        );
        mapping.record(commit.id, new_id);
        current_parent = Some(new_id);
    }

    let last = mapping.iter().last();
    match last {
        Some((_, new_tip)) => Ok((new_tip, mapping)),
        None => Err(RewriteError::NoCommitsToRewrite {
            branch: range.branch.clone(),
        }
        .into()),
    }
}

/// Rewrite `request.branch` end to end.
///
/// The branch moves only after every commit was rewritten, and only if it
/// still points where it did when the rewrite started.
///
/// # Errors
///
/// Any [`RewriteError`], plus git failures. On error the branch is unchanged.
pub fn rewrite_branch<R>(repo: &R, request: &RewriteRequest<'_>) -> TgtResult<RewriteOutcome>
where
    R: CommitGraph + BranchRefs + ?Sized,
{
    let branch = request.branch.as_str();
    let old_tip = repo.branch_tip(branch)?;
    let range = resolve_range(repo, branch, old_tip, &request.boundary, request.skip_signed)?;
    validate_linear(&range)?;
    info!(
        branch,
        commits = range.len(),
        boundary = %request.boundary,
        transform = request.transform.label(),
        "rewriting history"
    );

    if request.dry_run {
        return Ok(RewriteOutcome {
            branch: branch.to_string(),
            old_tip,
            new_tip: old_tip,
            boundary: range.boundary,
            range_len: range.len(),
            mapping: RewriteMapping::default(),
            dry_run: true,
        });
    }

    let (new_tip, mapping) =
        rewrite_commits(repo, &range, &request.transform, request.skip_signed)?;

    if new_tip == old_tip {
        info!(branch, "every commit kept, branch left as is");
    } else {
        update_branch(repo, branch, old_tip, new_tip, request.transform.label())?;
    }

    Ok(RewriteOutcome {
        branch: branch.to_string(),
        old_tip,
        new_tip,
        boundary: range.boundary,
        range_len: range.len(),
        mapping,
        dry_run: false,
    })
}
