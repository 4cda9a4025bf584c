// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-commit transformation.
//!
//! ```text
//! original commit + new parent
//!          |
//!          v
//!   copy tree, message, extra headers, timestamps
//!   drop gpgsig / gpgsig-sha256
//!          |
//!   Identity: author (and committer per policy) replaced
//!   Sign:     metadata untouched
//!          |
//!   signer? --> sign(serialized commit) --> gpgsig
//!          v
//!   new CommitData (not yet stored)
//! ```

use gix::ObjectId;
use gix::bstr::{BStr, BString, ByteSlice};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RewriteError, TgtResult};
use crate::git::{Commit, CommitData};
use crate::signing::CommitSigner;

/// Loose `local@domain` shape; no further validation is attempted.
const EMAIL_PATTERN: &str = r"^[^@\s<>]+@[^@\s<>]+$";

/// A replacement name/email pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    name: BString,
    email: BString,
}

impl NewIdentity {
    /// Validate and build an identity.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the name is blank or the email
    /// does not look like `local@domain`.
    pub fn new(name: &str, email: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "identity".to_string(),
                key: "name".to_string(),
                message: "author name must not be empty".to_string(),
            });
        }
        let pattern = Regex::new(EMAIL_PATTERN).map_err(|e| ConfigError::InvalidValue {
            section: "identity".to_string(),
            key: "email".to_string(),
            message: format!("failed to compile email pattern: {e}"),
        })?;
        if !pattern.is_match(email) {
            return Err(ConfigError::InvalidValue {
                section: "identity".to_string(),
                key: "email".to_string(),
                message: format!("'{email}' is not an email address"),
            });
        }
        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
        })
    }

    #[must_use]
    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    #[must_use]
    pub fn email(&self) -> &BStr {
        self.email.as_bstr()
    }
}

impl std::fmt::Display for NewIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// What an identity rewrite does with the committer field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CommitterPolicy {
    /// Committer becomes the new author.
    #[default]
    Author,
    /// Committer is left as it was.
    Preserve,
    /// Committer becomes the repository's configured `user.name`/`user.email`.
    Invoker,
}

impl std::fmt::Display for CommitterPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Author => write!(f, "author"),
            Self::Preserve => write!(f, "preserve"),
            Self::Invoker => write!(f, "invoker"),
        }
    }
}

/// The change applied to every commit in a range.
pub enum Transform<'a> {
    /// Replace the author, and the committer when `committer` is set.
    Identity {
        author: NewIdentity,
        committer: Option<NewIdentity>,
        signer: Option<&'a dyn CommitSigner>,
    },
    /// Add a signature, leaving all metadata alone.
    Sign { signer: &'a dyn CommitSigner },
}

impl std::fmt::Debug for Transform<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity {
                author,
                committer,
                signer,
            } => f
                .debug_struct("Identity")
                .field("author", author)
                .field("committer", committer)
                .field("signs", &signer.is_some())
                .finish(),
            Self::Sign { .. } => f.debug_struct("Sign").finish_non_exhaustive(),
        }
    }
}

impl Transform<'_> {
    /// Short name used in reflog messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Identity { .. } => "change-author",
            Self::Sign { .. } => "sign",
        }
    }

    /// Build the replacement for `original` on top of `new_parent`.
    ///
    /// Inputs are left untouched; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::NonLinearHistory` for a merge commit and
    /// `RewriteError::SigningUnavailable` if signing fails.
    pub fn apply(&self, original: &Commit, new_parent: Option<ObjectId>) -> TgtResult<CommitData> {
        if original.parent_count() > 1 {
            return Err(RewriteError::NonLinearHistory {
                commit: original.id,
                parents: original.parent_count(),
            }
            .into());
        }

        let mut data = original.data.clone();
        data.parents = new_parent.into_iter().collect();
        data.strip_signatures();

        let signer = match self {
            Self::Identity {
                author,
                committer,
                signer,
            } => {
                data.author = data
                    .author
                    .with_name_and_email(author.name(), author.email());
                if let Some(committer) = committer {
                    data.committer = data
                        .committer
                        .with_name_and_email(committer.name(), committer.email());
                }
                *signer
            }
            Self::Sign { signer } => Some(*signer),
        };

        if let Some(signer) = signer {
            let signature = signer.sign(&data.to_bytes())?;
            data.set_signature(signature);
        }
        Ok(data)
    }
}
