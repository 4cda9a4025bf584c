// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the history rewriting commands.
//!
//! ```text
//! change-author   boundary: root, or --base REV
//!                 identity: --author-name/--author-email, else [identity]
//!                 --sign also signs, --committer picks the committer
//!
//! sign            boundary: last signed commit, --root, or --base REV
//!                 --push force-pushes to --remote afterwards
//! ```

use clap::Args;

use crate::rewrite::CommitterPolicy;

/// Arguments for the `change-author` command.
#[derive(Debug, Clone, Args)]
pub struct ChangeAuthorArgs {
    /// New author name. Defaults to `identity.name`.
    #[arg(long = "author-name", value_name = "NAME")]
    pub author_name: Option<String>,

    /// New author email. Defaults to `identity.email`.
    #[arg(long = "author-email", value_name = "EMAIL")]
    pub author_email: Option<String>,

    /// Only rewrite commits after the merge-base with this revision.
    /// Without it the whole branch down to the root is rewritten.
    #[arg(long, value_name = "REV")]
    pub base: Option<String>,

    /// Also sign the rewritten commits.
    #[arg(long)]
    pub sign: bool,

    /// What to do with the committer. Defaults to `identity.committer`.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub committer: Option<CommitterPolicy>,
}

/// Arguments for the `sign` command.
#[derive(Debug, Clone, Args)]
pub struct SignArgs {
    /// Only sign commits after the merge-base with this revision.
    #[arg(long, value_name = "REV", conflicts_with = "root")]
    pub base: Option<String>,

    /// Sign everything down to the root commit, keeping commits that are
    /// already signed and whose parents did not change.
    #[arg(long)]
    pub root: bool,

    /// Force-push the branch after signing.
    #[arg(long)]
    pub push: bool,

    /// Remote used by --push. Defaults to `rewrite.remote`.
    #[arg(long, value_name = "NAME", requires = "push")]
    pub remote: Option<String>,
}
