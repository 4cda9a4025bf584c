// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Owned commit objects.
//!
//! ```text
//! tree <hex>
//! parent <hex>            (0..n)
//! author <name> <<email>> <time>
//! committer <name> <<email>> <time>
//! encoding <name>         (optional)
//! <header> <value>        (extra headers; '\n' -> '\n ' continuation)
//! gpgsig <armored sig>    (extra header, optional)
//!
//! <message bytes>
//! ```
//!
//! Timestamps are kept as the raw `"<seconds> <+hhmm>"` text so that a
//! rewrite reproduces them byte for byte.

use gix::ObjectId;
use gix::bstr::{BStr, BString, ByteSlice};

/// Header names that carry a commit signature.
pub const SIGNATURE_HEADERS: [&str; 2] = ["gpgsig", "gpgsig-sha256"];

/// Header name used when adding a signature.
pub const SIGNATURE_HEADER: &str = "gpgsig";

/// Author or committer of a commit.
///
/// Keeps the identity line exactly as stored so that a rewrite which does
/// not touch the person reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: BString,
    email: BString,
    /// Raw timestamp text, e.g. `1700000000 +0100`.
    time: String,
    /// `<name> <<email>> <time>` as written to the object.
    line: BString,
}

impl Identity {
    pub fn new(name: impl Into<BString>, email: impl Into<BString>, time: impl Into<String>) -> Self {
        let (name, email, time) = (name.into(), email.into(), time.into());
        let line = compose_line(&name, &email, &time);
        Self {
            name,
            email,
            time,
            line,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    /// Email address, without angle brackets.
    #[must_use]
    pub fn email(&self) -> &BStr {
        self.email.as_bstr()
    }

    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Same timestamp, different person.
    #[must_use]
    pub fn with_name_and_email(&self, name: &BStr, email: &BStr) -> Self {
        Self::new(name, email, self.time.clone())
    }

    /// `Name <email>` as used for gpg key selection.
    #[must_use]
    pub fn ident(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    fn from_parts(line: &BStr, signature: &gix::actor::SignatureRef<'_>) -> Self {
        let time = line
            .rfind_byte(b'>')
            .map(|end| line[end + 1..].trim_start().to_str_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name: BString::from(signature.name.trim()),
            email: BString::from(signature.email.trim()),
            time,
            line: line.to_owned(),
        }
    }

    fn write_line(&self, field: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(field.as_bytes());
        out.push(b' ');
        out.extend_from_slice(&self.line);
        out.push(b'\n');
    }
}

fn compose_line(name: &[u8], email: &[u8], time: &str) -> BString {
    let mut line = Vec::with_capacity(name.len() + email.len() + time.len() + 4);
    line.extend_from_slice(name);
    line.extend_from_slice(b" <");
    line.extend_from_slice(email);
    line.extend_from_slice(b"> ");
    line.extend_from_slice(time.as_bytes());
    line.into()
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Content of a commit object, without its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitData {
    /// Tree snapshot; copied verbatim by every rewrite.
    pub tree: ObjectId,
    /// Parent ids in order.
    pub parents: Vec<ObjectId>,
    pub author: Identity,
    pub committer: Identity,
    /// Message encoding, when not UTF-8.
    pub encoding: Option<BString>,
    /// Extra headers in order of appearance, continuation lines already joined.
    pub extra_headers: Vec<(BString, BString)>,
    /// Raw message bytes.
    pub message: BString,
}

impl CommitData {
    /// Copy a decoded gix commit into an owned value.
    ///
    /// Multi-line header values lose the trailing newline gix leaves on
    /// them; [`to_bytes`](Self::to_bytes) writes the terminator itself.
    pub fn from_commit_ref(
        commit: &gix::objs::CommitRef<'_>,
    ) -> Result<Self, gix::objs::decode::Error> {
        Ok(Self {
            tree: commit.tree(),
            parents: commit.parents().collect(),
            author: Identity::from_parts(commit.author, &commit.author()?),
            committer: Identity::from_parts(commit.committer, &commit.committer()?),
            encoding: commit.encoding.map(|e| BString::from(e.to_vec())),
            extra_headers: commit
                .extra_headers
                .iter()
                .map(|(name, value)| (BString::from(name.to_vec()), header_value(value)))
                .collect(),
            message: BString::from(commit.message.to_vec()),
        })
    }

    /// True if any signature header is present.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature().is_some()
    }

    /// The first signature header value, if any.
    #[must_use]
    pub fn signature(&self) -> Option<&BStr> {
        self.extra_headers
            .iter()
            .find(|(name, _)| is_signature_header(name.as_bstr()))
            .map(|(_, value)| value.as_bstr())
    }

    /// Remove every signature header.
    pub fn strip_signatures(&mut self) {
        self.extra_headers.retain(|(name, _)| !is_signature_header(name.as_bstr()));
    }

    /// Replace any existing signature with `signature`.
    ///
    /// A single trailing newline is dropped; it is the header terminator.
    pub fn set_signature(&mut self, signature: impl Into<BString>) {
        self.strip_signatures();
        let mut signature: BString = signature.into();
        if signature.last() == Some(&b'\n') {
            signature.pop();
        }
        self.extra_headers
            .push((BString::from(SIGNATURE_HEADER), signature));
    }

    /// First line of the message, lossily decoded.
    #[must_use]
    pub fn summary(&self) -> String {
        self.message
            .lines()
            .next()
            .map(|line| line.to_str_lossy().trim().to_string())
            .unwrap_or_default()
    }

    /// Serialize in canonical git commit layout.
    ///
    /// This is exactly the byte string git hashes (after the object header),
    /// and, without signature headers, the payload a signer signs.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.message.len());
        write_header(&mut out, b"tree", self.tree.to_string().as_bytes());
        for parent in &self.parents {
            write_header(&mut out, b"parent", parent.to_string().as_bytes());
        }
        self.author.write_line("author", &mut out);
        self.committer.write_line("committer", &mut out);
        if let Some(encoding) = &self.encoding {
            write_header(&mut out, b"encoding", encoding);
        }
        for (name, value) in &self.extra_headers {
            write_header(&mut out, name, value);
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Serialization with all signature headers removed.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut unsigned = self.clone();
        unsigned.strip_signatures();
        unsigned.to_bytes()
    }
}

/// A stored commit: its id plus content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: ObjectId,
    pub data: CommitData,
}

impl Commit {
    #[must_use]
    pub fn parent_count(&self) -> usize {
        self.data.parents.len()
    }

    /// Sole or first parent; `None` for a root commit.
    #[must_use]
    pub fn first_parent(&self) -> Option<ObjectId> {
        self.data.parents.first().copied()
    }

    /// Abbreviated hex id for messages.
    #[must_use]
    pub fn short_id(&self) -> String {
        short_hex(&self.id)
    }
}

/// First eight hex digits of `id`.
#[must_use]
pub fn short_hex(id: &ObjectId) -> String {
    id.to_hex_with_len(8).to_string()
}

fn header_value(value: &BStr) -> BString {
    let mut value = value.to_owned();
    if value.contains(&b'\n') && value.last() == Some(&b'\n') {
        value.pop();
    }
    value
}

fn is_signature_header(name: &BStr) -> bool {
    SIGNATURE_HEADERS.iter().any(|h| name == h.as_bytes())
}

fn write_header(out: &mut Vec<u8>, name: &[u8], value: &[u8]) {
    out.extend_from_slice(name);
    out.push(b' ');
    for &byte in value {
        out.push(byte);
        if byte == b'\n' {
            out.push(b' ');
        }
    }
    out.push(b'\n');
}
