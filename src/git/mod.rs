// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git access module.
//!
//! ```text
//!            Repo (repo.rs)
//!   CommitGraph + BranchRefs impls
//!        |              |
//!        v              v
//!    query.rs        cmd.rs
//!        |              |
//!        v              v
//!    GitQuery      GitMutation
//!   (gix, read)    (CLI, write)
//!        |              |
//!        v              v
//!    GixBackend    ShellBackend
//!    .is_repo      .hash-object
//!    .branch       .update-ref (CAS)
//!    .uncommit     .push --force
//!    .commits      .config / verify-commit
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess, read-only.
//! **`ShellBackend`**: git CLI for object and reference writes.
//! **`object`**: owned commit model with byte-exact serialization.

pub mod backend;
pub mod cmd;
pub mod object;
pub mod query;
pub mod repo;

pub use backend::{BranchRefs, CommitGraph};
pub use object::{Commit, CommitData, Identity};
pub use repo::Repo;
