// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit signing and signature checks.
//!
//! ```text
//! [signing] config ──┐
//!                    ├─> resolve_signer() ──> Box<dyn CommitSigner>
//! git config ────────┘         │
//!   gpg.format                 ├─ openpgp ─> GpgSigner (gpg)
//!   user.signingKey            ├─ x509 ────> GpgSigner (gpgsm)
//!   gpg[.<fmt>].program        └─ ssh ─────> SshSigner (ssh-keygen -Y sign)
//!
//! SignatureCheck
//!   HeaderPresence   gpgsig header present
//!   GitVerify        git verify-commit accepts it
//! ```
//!
//! Every signing failure surfaces as `RewriteError::SigningUnavailable`.

pub mod gpg;
pub mod ssh;


use gix::bstr::BString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::types::SigningConfig;
use crate::error::{ConfigError, TgtResult};
use crate::git::{Commit, Repo};

pub use gpg::GpgSigner;
pub use ssh::SshSigner;

/// Produces a detached signature over a commit payload.
pub trait CommitSigner {
    /// Sign `payload`, returning the armored signature text.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::SigningUnavailable` if no signature can be produced.
    fn sign(&self, payload: &[u8]) -> TgtResult<BString>;
}

impl<F> CommitSigner for F
where
    F: Fn(&[u8]) -> TgtResult<BString>,
{
    fn sign(&self, payload: &[u8]) -> TgtResult<BString> {
        self(payload)
    }
}

/// Decides whether an existing commit already carries a valid signature.
pub trait SignatureCheck {
    /// # Errors
    ///
    /// Returns an error if the check itself cannot run.
    fn is_signed(&self, commit: &Commit) -> TgtResult<bool>;
}

/// A signature header is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPresence;

impl SignatureCheck for HeaderPresence {
    fn is_signed(&self, commit: &Commit) -> TgtResult<bool> {
        Ok(commit.data.is_signed())
    }
}

/// A signature header is present and `git verify-commit` accepts it.
#[derive(Debug)]
pub struct GitVerify<'a> {
    repo: &'a Repo,
}

impl<'a> GitVerify<'a> {
    #[must_use]
    pub const fn new(repo: &'a Repo) -> Self {
        Self { repo }
    }
}

impl SignatureCheck for GitVerify<'_> {
    fn is_signed(&self, commit: &Commit) -> TgtResult<bool> {
        if !commit.data.is_signed() {
            return Ok(false);
        }
        let verified = self.repo.verify_commit(commit.id)?;
        if !verified {
            debug!(commit = %commit.short_id(), "signature present but not verifiable");
        }
        Ok(verified)
    }
}

/// Signature flavor, named as in git's `gpg.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureFormat {
    #[default]
    OpenPgp,
    X509,
    Ssh,
}

impl SignatureFormat {
    /// Program used when none is configured.
    #[must_use]
    pub const fn default_program(self) -> &'static str {
        match self {
            Self::OpenPgp => "gpg",
            Self::X509 => "gpgsm",
            Self::Ssh => "ssh-keygen",
        }
    }

    /// git config keys consulted for the program, most specific first.
    #[must_use]
    pub const fn program_config_keys(self) -> &'static [&'static str] {
        match self {
            Self::OpenPgp => &["gpg.openpgp.program", "gpg.program"],
            Self::X509 => &["gpg.x509.program"],
            Self::Ssh => &["gpg.ssh.program"],
        }
    }
}

impl std::fmt::Display for SignatureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenPgp => write!(f, "openpgp"),
            Self::X509 => write!(f, "x509"),
            Self::Ssh => write!(f, "ssh"),
        }
    }
}

impl std::str::FromStr for SignatureFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openpgp" => Ok(Self::OpenPgp),
            "x509" => Ok(Self::X509),
            "ssh" => Ok(Self::Ssh),
            _ => Err(ConfigError::InvalidValue {
                section: "signing".to_string(),
                key: "format".to_string(),
                message: format!("expected 'openpgp', 'x509', or 'ssh', got '{s}'"),
            }),
        }
    }
}

/// Fully resolved signing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSettings {
    pub format: SignatureFormat,
    pub program: String,
    /// Key id, key file, or `None` for the program's default key.
    pub key: Option<String>,
}

/// Fill unset `[signing]` values from git config.
///
/// The key falls back to `user.signingKey`, then (for openpgp/x509) to the
/// configured `user.name <user.email>`.
///
/// # Errors
///
/// Returns a `ConfigError` if `gpg.format` holds an unknown value, or a
/// `GitError` if git config cannot be read.
pub fn resolve_settings(repo: &Repo, config: &SigningConfig) -> TgtResult<SignerSettings> {
    let format = match config.format {
        Some(format) => format,
        None => match repo.config_value("gpg.format")? {
            Some(value) => value.parse()?,
            None => SignatureFormat::default(),
        },
    };

    let mut program = config.program.clone();
    if program.is_none() {
        for key in format.program_config_keys() {
            program = repo.config_value(key)?;
            if program.is_some() {
                break;
            }
        }
    }
    let program = program.unwrap_or_else(|| format.default_program().to_string());

    let mut key = config.key.clone();
    if key.is_none() {
        key = repo.config_value("user.signingKey")?;
    }
    if key.is_none() && format != SignatureFormat::Ssh {
        let name = repo.config_value("user.name")?;
        let email = repo.config_value("user.email")?;
        if let (Some(name), Some(email)) = (name, email) {
            key = Some(format!("{name} <{email}>"));
        }
    }

    debug!(%format, program = %program, key = ?key, "resolved signing settings");
    Ok(SignerSettings {
        format,
        program,
        key,
    })
}

/// Build the signer described by `settings`.
#[must_use]
pub fn signer_for(settings: &SignerSettings) -> Box<dyn CommitSigner> {
    match settings.format {
        SignatureFormat::OpenPgp | SignatureFormat::X509 => Box::new(GpgSigner::new(
            settings.program.clone(),
            settings.key.clone(),
        )),
        SignatureFormat::Ssh => Box::new(SshSigner::new(
            settings.program.clone(),
            settings.key.clone(),
        )),
    }
}

/// Resolve settings and build the signer in one step.
///
/// # Errors
///
/// See [`resolve_settings`].
pub fn resolve_signer(repo: &Repo, config: &SigningConfig) -> TgtResult<Box<dyn CommitSigner>> {
    let settings = resolve_settings(repo, config)?;
    Ok(signer_for(&settings))
}
