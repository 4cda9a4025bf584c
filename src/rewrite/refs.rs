// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Final branch move.

use gix::ObjectId;
use tracing::info;

use crate::error::TgtResult;
use crate::git::BranchRefs;
use crate::git::object::short_hex;

/// Point `branch` at `new_tip`, provided it still points at `old_tip`.
///
/// This is the only place a rewrite becomes visible.
///
/// # Errors
///
/// Returns `RewriteError::ConcurrentModification` if the branch moved since
/// it was read; the branch is left where the other writer put it.
pub fn update_branch<R>(
    refs: &R,
    branch: &str,
    old_tip: ObjectId,
    new_tip: ObjectId,
    reason: &str,
) -> TgtResult<()>
where
    R: BranchRefs + ?Sized,
{
    let message = format!("tgt {reason}: {} -> {}", short_hex(&old_tip), short_hex(&new_tip));
    refs.compare_and_set(branch, old_tip, new_tip, &message)?;
    info!(
        branch,
        old = %short_hex(&old_tip),
        new = %short_hex(&new_tip),
        "branch updated"
    );
    Ok(())
}
