// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! OpenPGP and X.509 signatures via `gpg` / `gpgsm`.
//!
//! ```text
//! payload --stdin--> <program> --status-fd=2 -bsa [-u <key>]
//!                        stdout: armored detached signature
//!                        stderr: must report "[GNUPG:] SIG_CREATED"
//! ```

use gix::bstr::BString;
use tracing::debug;

use super::CommitSigner;
use crate::core::process::{ProcessBuilder, ProcessFlags};
use crate::error::{RewriteError, TgtResult};

const SIG_CREATED: &str = "[GNUPG:] SIG_CREATED ";

/// Signs with a gpg-compatible program.
#[derive(Debug, Clone)]
pub struct GpgSigner {
    program: String,
    key: Option<String>,
}

impl GpgSigner {
    #[must_use]
    pub const fn new(program: String, key: Option<String>) -> Self {
        Self { program, key }
    }
}

impl CommitSigner for GpgSigner {
    fn sign(&self, payload: &[u8]) -> TgtResult<BString> {
        let mut builder = ProcessBuilder::which(&self.program)
            .map_err(|e| RewriteError::signing_unavailable(e.to_string()))?
            .args(["--status-fd=2", "-bsa"])
            .stdin(payload)
            .flag(ProcessFlags::ALLOW_FAILURE);
        if let Some(key) = &self.key {
            builder = builder.arg("-u").arg(key);
        }

        debug!(program = %self.program, key = ?self.key, "signing commit payload");
        let output = builder
            .run()
            .map_err(|e| RewriteError::signing_unavailable(e.to_string()))?;

        if !output.success() || !output.stderr().lines().any(|l| l.starts_with(SIG_CREATED)) {
            return Err(RewriteError::signing_unavailable(format!(
                "{} failed to sign the data: {}",
                self.program,
                diagnostics(output.stderr())
            ))
            .into());
        }

        let signature = output.into_stdout();
        if signature.trim().is_empty() {
            return Err(RewriteError::signing_unavailable(format!(
                "{} produced an empty signature",
                self.program
            ))
            .into());
        }
        Ok(BString::from(signature))
    }
}

/// stderr with the machine-readable status lines removed.
fn diagnostics(stderr: &str) -> String {
    let text = stderr
        .lines()
        .filter(|l| !l.starts_with("[GNUPG:]"))
        .collect::<Vec<_>>()
        .join("; ");
    if text.trim().is_empty() {
        "no diagnostics".to_string()
    } else {
        text
    }
}
