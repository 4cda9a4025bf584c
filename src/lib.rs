// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |         change-author / sign
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |          rewrite          |
//!              |  range -> transform ->    |
//!              |  orchestrator -> ref CAS  |
//!              '------+-------------+------'
//!                     v             v
//!                    git         signing
//!              gix reads,      gpg / gpgsm /
//!              git CLI writes  ssh-keygen
//!
//!   +-----------------------------------------+
//!   |  core   process runner                  |
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod logging;
pub mod rewrite;
pub mod signing;
