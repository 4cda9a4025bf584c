// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! SSH signatures via `ssh-keygen -Y sign -n git`.

use std::path::PathBuf;

use gix::bstr::BString;
use tracing::debug;

use super::CommitSigner;
use crate::core::process::{ProcessBuilder, ProcessFlags};
use crate::error::{RewriteError, TgtResult};

const SSH_SIGNATURE_BEGIN: &str = "-----BEGIN SSH SIGNATURE-----";

/// Signs with `ssh-keygen` using a private key file, or a public key file
/// whose private half is held by an agent.
#[derive(Debug, Clone)]
pub struct SshSigner {
    program: String,
    key: Option<String>,
}

impl SshSigner {
    #[must_use]
    pub const fn new(program: String, key: Option<String>) -> Self {
        Self { program, key }
    }

    fn key_path(&self) -> TgtResult<PathBuf> {
        let Some(key) = self.key.as_deref() else {
            return Err(RewriteError::signing_unavailable(
                "no SSH signing key configured (set signing.key or git's user.signingKey)",
            )
            .into());
        };
        if key.starts_with("key::") {
            return Err(RewriteError::signing_unavailable(
                "literal SSH keys are not supported; point the signing key at a key file",
            )
            .into());
        }
        Ok(expand_home(key))
    }
}

impl CommitSigner for SshSigner {
    fn sign(&self, payload: &[u8]) -> TgtResult<BString> {
        let key = self.key_path()?;
        if !key.exists() {
            return Err(RewriteError::signing_unavailable(format!(
                "SSH signing key '{}' does not exist",
                key.display()
            ))
            .into());
        }

        debug!(program = %self.program, key = %key.display(), "signing commit payload");
        let output = ProcessBuilder::which(&self.program)
            .map_err(|e| RewriteError::signing_unavailable(e.to_string()))?
            .args(["-Y", "sign", "-n", "git", "-f"])
            .arg(&key)
            .stdin(payload)
            .flag(ProcessFlags::ALLOW_FAILURE)
            .run()
            .map_err(|e| RewriteError::signing_unavailable(e.to_string()))?;

        let signature = output.stdout();
        if !output.success() || !signature.contains(SSH_SIGNATURE_BEGIN) {
            return Err(RewriteError::signing_unavailable(format!(
                "{} failed to sign the data: {}",
                self.program,
                output.stderr().trim()
            ))
            .into());
        }
        Ok(BString::from(output.into_stdout()))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
