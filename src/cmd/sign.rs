// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `sign`: add missing signatures on the current branch.

use std::path::Path;

use tracing::info;

use super::{RunOptions, open_branch, report};
use crate::cli::rewrite::SignArgs;
use crate::config::Config;
use crate::error::Result;
use crate::rewrite::{Boundary, RewriteRequest, Transform, rewrite_branch};
use crate::signing::{GitVerify, HeaderPresence, SignatureCheck, resolve_signer};

/// Main handler for the `sign` command.
///
/// # Errors
///
/// Returns an error if a pre-flight check fails, no signer is available,
/// the rewrite fails, or the push is rejected.
pub fn run_sign_command(
    args: &SignArgs,
    config: &Config,
    repo_path: &Path,
    options: RunOptions,
) -> Result<()> {
    let (repo, branch) = open_branch(repo_path, &config.rewrite)?;
    let signer = resolve_signer(&repo, &config.signing)?;

    let verify;
    let check: &dyn SignatureCheck = if config.signing.verify_existing {
        verify = GitVerify::new(&repo);
        &verify
    } else {
        &HeaderPresence
    };

    let boundary = sign_boundary(args);
    info!(%boundary, "signing commits");
    let request = RewriteRequest::builder()
        .branch(branch.as_str())
        .with_boundary(boundary)
        .transform(Transform::Sign {
            signer: signer.as_ref(),
        })
        .with_skip_signed(check)
        .with_dry_run(options.dry_run)
        .build();

    report(rewrite_branch(&repo, &request), &branch, options)?;

    if args.push {
        let remote = args.remote.as_deref().unwrap_or(&config.rewrite.remote);
        if options.dry_run {
            info!(remote, branch = %branch, "dry run, not pushing");
        } else {
            repo.push_force(remote, &branch)?;
            info!(remote, branch = %branch, "pushed");
        }
    }
    Ok(())
}

/// Boundary selected by `--base` / `--root`; the last signed commit otherwise.
#[must_use]
pub fn sign_boundary(args: &SignArgs) -> Boundary {
    match (&args.base, args.root) {
        (Some(rev), _) => Boundary::MergeBase(rev.clone()),
        (None, true) => Boundary::Root,
        (None, false) => Boundary::SignedAncestor,
    }
}
