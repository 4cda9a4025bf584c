// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules.
//!
//! ```text
//!     core
//!      |
//!      v
//!   process
//!      |
//!   Builder --> Output
//! ```

pub mod process;
