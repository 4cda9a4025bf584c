// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for tiny-git-tools using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! tgt [global options] <command>
//! change-author --author-name NAME --author-email EMAIL [--base REV] [--sign]
//! sign [--base REV | --root] [--push] [--remote NAME]
//! options
//! config-files
//! version
//! ```

pub mod global;
pub mod rewrite;


use crate::cli::global::GlobalOptions;
use crate::cli::rewrite::{ChangeAuthorArgs, SignArgs};
use clap::{Parser, Subcommand};

/// Git history maintenance tools
#[derive(Debug, Parser)]
#[command(
    name = "tgt",
    author,
    version,
    about = "Git history maintenance tools",
    long_about = "tiny-git-tools Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Rewrites the linear history of the current branch: replaces the\n\
                  author identity with `tgt change-author`, or adds missing\n\
                  signatures with `tgt sign`. The branch only moves once every\n\
                  commit has been rewritten.",
    after_help = "CONFIGURATION:\n\n\
                  tgt reads <config dir>/tiny-git-tools/config.toml, then tgt.toml\n\
                  in the repository root, then every --config file, then TGT_*\n\
                  environment variables (TGT_SIGNING__FORMAT=ssh). Later sources\n\
                  override earlier ones. Unset signing options fall back to git's\n\
                  gpg.format, user.signingKey and gpg.program."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files that were loaded.
    ConfigFiles,

    /// Replaces the author of every commit on the current branch.
    ChangeAuthor(ChangeAuthorArgs),

    /// Signs the unsigned commits on the current branch.
    Sign(SignArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
