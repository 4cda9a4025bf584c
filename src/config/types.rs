// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for tiny-git-tools.
//!
//! # Config Structure
//!
//! ```text
//! Config
//!   global    log levels, log file
//!   identity  default name/email for change-author, committer policy
//!   signing   format, key, program, verify_existing
//!   rewrite   push remote, allow_dirty
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::rewrite::CommitterPolicy;
use crate::signing::SignatureFormat;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Defaults for `change-author`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// New author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New author email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// What happens to the committer field.
    pub committer: CommitterPolicy,
}

/// Signing options. Unset values fall back to git config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// Signature format; falls back to `gpg.format`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SignatureFormat>,
    /// Key id or key file; falls back to `user.signingKey`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Signing program; falls back to `gpg.program` and friends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Only count signatures that `git verify-commit` accepts as already signed.
    pub verify_existing: bool,
}

/// Rewrite behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Remote used by `--push`.
    pub remote: String,
    /// Allow rewriting with uncommitted changes in the worktree.
    pub allow_dirty: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            allow_dirty: false,
        }
    }
}
