// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Synchronous process spawning.
//!
//! ```text
//! ProcessBuilder::new("git")
//!   .args() .cwd() .env() .stdin()
//!   .run()
//!       --> std::process::Command (stdout/stderr captured)
//!       --> ProcessOutput { exit_code, stdout, stderr }
//! ```
//!
//! Every external program this crate drives (git, gpg, gpgsm, ssh-keygen)
//! goes through here.

pub mod builder;

pub use builder::{ProcessBuilder, ProcessFlags, ProcessOutput};
