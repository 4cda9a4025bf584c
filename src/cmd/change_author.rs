// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `change-author`: replace the author identity on the current branch.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use super::{RunOptions, open_branch, report};
use crate::cli::rewrite::ChangeAuthorArgs;
use crate::config::Config;
use crate::config::types::IdentityConfig;
use crate::error::{ConfigError, Result};
use crate::git::Repo;
use crate::rewrite::{
    Boundary, CommitterPolicy, NewIdentity, RewriteRequest, Transform, rewrite_branch,
};
use crate::signing::resolve_signer;

/// Main handler for the `change-author` command.
///
/// # Errors
///
/// Returns an error if the identity is missing or invalid, a pre-flight
/// check fails, or the rewrite fails.
pub fn run_change_author_command(
    args: &ChangeAuthorArgs,
    config: &Config,
    repo_path: &Path,
    options: RunOptions,
) -> Result<()> {
    let author = resolve_author(args, &config.identity)?;
    let (repo, branch) = open_branch(repo_path, &config.rewrite)?;

    let policy = args.committer.unwrap_or(config.identity.committer);
    let committer = committer_for(policy, &author, &repo)?;
    let signer = if args.sign {
        Some(resolve_signer(&repo, &config.signing)?)
    } else {
        None
    };
    let boundary = args.base.clone().map_or(Boundary::Root, Boundary::MergeBase);

    info!(%author, committer = %policy, sign = args.sign, "changing author");
    let request = RewriteRequest::builder()
        .branch(branch.as_str())
        .with_boundary(boundary)
        .transform(Transform::Identity {
            author,
            committer,
            signer: signer.as_deref(),
        })
        .with_dry_run(options.dry_run)
        .build();

    report(rewrite_branch(&repo, &request), &branch, options)?;
    Ok(())
}

/// New author from the arguments, falling back to `[identity]`.
///
/// # Errors
///
/// Returns `ConfigError::MissingKey` when neither source names the author,
/// and `ConfigError::InvalidValue` when the identity is malformed.
pub fn resolve_author(
    args: &ChangeAuthorArgs,
    identity: &IdentityConfig,
) -> std::result::Result<NewIdentity, ConfigError> {
    let name = args
        .author_name
        .as_deref()
        .or(identity.name.as_deref())
        .ok_or_else(|| ConfigError::MissingKey {
            section: "identity".to_string(),
            key: "name".to_string(),
        })?;
    let email = args
        .author_email
        .as_deref()
        .or(identity.email.as_deref())
        .ok_or_else(|| ConfigError::MissingKey {
            section: "identity".to_string(),
            key: "email".to_string(),
        })?;
    NewIdentity::new(name, email)
}

fn committer_for(
    policy: CommitterPolicy,
    author: &NewIdentity,
    repo: &Repo,
) -> Result<Option<NewIdentity>> {
    match policy {
        CommitterPolicy::Author => Ok(Some(author.clone())),
        CommitterPolicy::Preserve => Ok(None),
        CommitterPolicy::Invoker => {
            let name = repo
                .config_value("user.name")?
                .context("git user.name is not set (needed for --committer invoker)")?;
            let email = repo
                .config_value("user.email")?
                .context("git user.email is not set (needed for --committer invoker)")?;
            Ok(Some(NewIdentity::new(&name, &email)?))
        }
    }
}
