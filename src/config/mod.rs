// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for tiny-git-tools.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. user config (<config dir>/tiny-git-tools/config.toml)
//! 3. repository tgt.toml (worktree root)
//! 4. --config FILE (repeatable)
//! 5. TGT_* env vars
//! 6. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! TGT_SIGNING__FORMAT=ssh        → signing.format = "ssh"
//! TGT_IDENTITY__EMAIL=a@b.c      → identity.email = "a@b.c"
//! TGT_REWRITE__ALLOW_DIRTY=true  → rewrite.allow_dirty = true
//! ```
//!
//! Signing values left unset here fall back to git's own configuration
//! (`gpg.format`, `user.signingKey`, `gpg.program`).

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use loader::ConfigLoader;
use types::{GlobalConfig, IdentityConfig, RewriteConfig, SigningConfig};

/// File name of the per-repository configuration file.
pub const REPO_CONFIG_FILE: &str = "tgt.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TGT";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging options.
    pub global: GlobalConfig,
    /// `change-author` defaults.
    pub identity: IdentityConfig,
    /// Signing options.
    pub signing: SigningConfig,
    /// Rewrite options.
    pub rewrite: RewriteConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tiny_git_tools::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("tgt.toml")
    ///     .with_env_prefix("TGT")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Format configuration options for display, one `key = value` per line.
    ///
    /// Unset optional values are shown as empty. Output is sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_identity_options(&mut options);
        self.format_signing_options(&mut options);
        self.format_rewrite_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file".into(), fmt_path(self.global.log_file.as_deref()));
    }

    fn format_identity_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "identity.name".into(),
            self.identity.name.clone().unwrap_or_default(),
        );
        options.insert(
            "identity.email".into(),
            self.identity.email.clone().unwrap_or_default(),
        );
        options.insert(
            "identity.committer".into(),
            self.identity.committer.to_string(),
        );
    }

    fn format_signing_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "signing.format".into(),
            self.signing
                .format
                .map_or_else(String::new, |f| f.to_string()),
        );
        options.insert(
            "signing.key".into(),
            self.signing.key.clone().unwrap_or_default(),
        );
        options.insert(
            "signing.program".into(),
            self.signing.program.clone().unwrap_or_default(),
        );
        options.insert(
            "signing.verify_existing".into(),
            self.signing.verify_existing.to_string(),
        );
    }

    fn format_rewrite_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("rewrite.remote".into(), self.rewrite.remote.clone());
        options.insert(
            "rewrite.allow_dirty".into(),
            self.rewrite.allow_dirty.to_string(),
        );
    }
}

/// `<config dir>/tiny-git-tools/config.toml`, if a config directory is known.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tiny-git-tools").join("config.toml"))
}

fn fmt_path(path: Option<&Path>) -> String {
    path.map_or_else(String::new, |p| p.display().to_string())
}
