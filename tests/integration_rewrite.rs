// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the rewrite engine.
//!
//! Runs the engine against real temporary repositories with an in-process
//! signer, then inspects the result through the git CLI.

use std::cell::Cell;
use std::path::Path;
use std::process::Command;

use gix::bstr::BString;
use tempfile::TempDir;
use tiny_git_tools::error::{RewriteError, TgtError, TgtResult};
use tiny_git_tools::git::{BranchRefs, CommitGraph, Repo};
use tiny_git_tools::rewrite::{Boundary, NewIdentity, RewriteRequest, Transform, rewrite_branch};
use tiny_git_tools::signing::{CommitSigner, HeaderPresence};

const TEST_SIGNATURE: &str =
    "-----BEGIN PGP SIGNATURE-----\n\nd2VsbCBzaWduZWQ=\n-----END PGP SIGNATURE-----\n";

/// Helper to run git commands in a directory, returning trimmed stdout.
fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Repository on `main` with one file-changing commit per message.
fn init_test_repo(messages: &[&str]) -> TempDir {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    git(temp.path(), &["init", "--quiet", "--initial-branch=main"]);
    for (i, message) in messages.iter().enumerate() {
        std::fs::write(temp.path().join("file.txt"), format!("revision {i}\n"))
            .expect("write file");
        git(temp.path(), &["add", "file.txt"]);
        git(temp.path(), &["commit", "--quiet", "-m", message]);
    }
    temp
}

fn log(path: &Path, format: &str) -> Vec<String> {
    git(path, &["log", "--reverse", &format!("--format={format}")])
        .lines()
        .map(str::to_string)
        .collect()
}

fn test_signer(_payload: &[u8]) -> TgtResult<BString> {
    Ok(BString::from(TEST_SIGNATURE))
}

fn sign_request(boundary: Boundary, signer: &dyn CommitSigner) -> RewriteRequest<'_> {
    RewriteRequest::builder()
        .branch("main")
        .with_boundary(boundary)
        .transform(Transform::Sign { signer })
        .with_skip_signed(&HeaderPresence)
        .build()
}

fn rewrite_error(err: &TgtError) -> &RewriteError {
    err.as_rewrite().expect("expected a rewrite error")
}

// =============================================================================
// Signing
// =============================================================================

#[test]
fn sign_three_unsigned_commits() {
    let temp = init_test_repo(&["one", "two", "three"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let old_tip = repo.branch_tip("main").unwrap();
    let trees_before = log(temp.path(), "%T");
    let authors_before = log(temp.path(), "%an <%ae> %at");

    let outcome =
        rewrite_branch(&repo, &sign_request(Boundary::SignedAncestor, &test_signer)).unwrap();

    assert_eq!(outcome.old_tip, old_tip);
    assert_ne!(outcome.new_tip, old_tip);
    assert_eq!(outcome.mapping.rewritten_count(), 3);
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), outcome.new_tip.to_string());
    assert_eq!(log(temp.path(), "%T"), trees_before);
    assert_eq!(log(temp.path(), "%an <%ae> %at"), authors_before);
    assert_eq!(log(temp.path(), "%s"), vec!["one", "two", "three"]);

    for id in git(temp.path(), &["rev-list", "main"]).lines() {
        let raw = git(temp.path(), &["cat-file", "commit", id]);
        assert!(raw.contains("gpgsig -----BEGIN PGP SIGNATURE-----"), "{raw}");
    }
    assert_eq!(
        git(temp.path(), &["rev-list", "--count", "main"]),
        "3",
        "history keeps its length"
    );
}

#[test]
fn sign_twice_is_a_no_op() {
    let temp = init_test_repo(&["one", "two"]);
    let repo = Repo::discover(temp.path()).unwrap();

    let first =
        rewrite_branch(&repo, &sign_request(Boundary::SignedAncestor, &test_signer)).unwrap();

    let err = rewrite_branch(&repo, &sign_request(Boundary::SignedAncestor, &test_signer))
        .unwrap_err();
    assert!(err.is_nothing_to_rewrite());

    let again = rewrite_branch(&repo, &sign_request(Boundary::Root, &test_signer)).unwrap();
    assert_eq!(again.new_tip, first.new_tip);
    assert_eq!(again.mapping.passed_through_count(), 2);
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), first.new_tip.to_string());
}

#[test]
fn signing_failure_leaves_branch_untouched() {
    let temp = init_test_repo(&["one", "two"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let old_tip = git(temp.path(), &["rev-parse", "main"]);

    let refuse = |_: &[u8]| -> TgtResult<BString> {
        Err(RewriteError::signing_unavailable("no secret key").into())
    };
    let err = rewrite_branch(&repo, &sign_request(Boundary::Root, &refuse)).unwrap_err();

    assert!(matches!(
        rewrite_error(&err),
        RewriteError::SigningUnavailable { .. }
    ));
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), old_tip);
}

#[test]
fn concurrent_update_is_detected() {
    let temp = init_test_repo(&["one", "two"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let t0 = git(temp.path(), &["rev-parse", "main"]);
    let t1 = git(
        temp.path(),
        &["commit-tree", "main^{tree}", "-p", "main", "-m", "pushed elsewhere"],
    );

    let moved = Cell::new(false);
    let racing_signer = |payload: &[u8]| -> TgtResult<BString> {
        if !moved.replace(true) {
            git(temp.path(), &["update-ref", "refs/heads/main", &t1]);
        }
        test_signer(payload)
    };
    let err = rewrite_branch(&repo, &sign_request(Boundary::Root, &racing_signer)).unwrap_err();

    match rewrite_error(&err) {
        RewriteError::ConcurrentModification {
            expected, actual, ..
        } => {
            assert_eq!(expected.to_string(), t0);
            assert_eq!(actual, &t1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), t1);
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn change_author_rewrites_every_commit() {
    let temp = init_test_repo(&["one", "two", "three"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let trees_before = log(temp.path(), "%T");
    let dates_before = log(temp.path(), "%at %ct");

    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: NewIdentity::new("New Name", "new@example.com").unwrap(),
            committer: Some(NewIdentity::new("New Name", "new@example.com").unwrap()),
            signer: None,
        })
        .build();
    let outcome = rewrite_branch(&repo, &request).unwrap();

    assert_eq!(outcome.mapping.len(), 3);
    assert_eq!(log(temp.path(), "%T"), trees_before);
    assert_eq!(log(temp.path(), "%at %ct"), dates_before);
    assert!(
        log(temp.path(), "%an <%ae>|%cn <%ce>")
            .iter()
            .all(|line| line == "New Name <new@example.com>|New Name <new@example.com>")
    );
}

#[test]
fn change_author_above_merge_base_only() {
    let temp = init_test_repo(&["base one", "base two"]);
    git(temp.path(), &["branch", "upstream"]);
    std::fs::write(temp.path().join("feature.txt"), "feature\n").unwrap();
    git(temp.path(), &["add", "feature.txt"]);
    git(temp.path(), &["commit", "--quiet", "-m", "feature"]);
    let upstream = git(temp.path(), &["rev-parse", "upstream"]);

    let repo = Repo::discover(temp.path()).unwrap();
    let request = RewriteRequest::builder()
        .branch("main")
        .with_boundary(Boundary::MergeBase("upstream".to_string()))
        .transform(Transform::Identity {
            author: NewIdentity::new("New Name", "new@example.com").unwrap(),
            committer: None,
            signer: None,
        })
        .build();
    let outcome = rewrite_branch(&repo, &request).unwrap();

    assert_eq!(outcome.mapping.len(), 1);
    assert_eq!(git(temp.path(), &["rev-parse", "main~1"]), upstream);
    assert_eq!(
        log(temp.path(), "%an"),
        vec!["Test User", "Test User", "New Name"]
    );
}

#[test]
fn merge_commit_is_rejected() {
    let temp = init_test_repo(&["one"]);
    git(temp.path(), &["checkout", "--quiet", "-b", "side"]);
    std::fs::write(temp.path().join("side.txt"), "side\n").unwrap();
    git(temp.path(), &["add", "side.txt"]);
    git(temp.path(), &["commit", "--quiet", "-m", "side"]);
    git(temp.path(), &["checkout", "--quiet", "main"]);
    std::fs::write(temp.path().join("main.txt"), "main\n").unwrap();
    git(temp.path(), &["add", "main.txt"]);
    git(temp.path(), &["commit", "--quiet", "-m", "main"]);
    git(temp.path(), &["merge", "--quiet", "--no-edit", "--no-ff", "side"]);
    git(temp.path(), &["commit", "--quiet", "--allow-empty", "-m", "after merge"]);
    let merge = git(temp.path(), &["rev-parse", "main~1"]);
    let tip = git(temp.path(), &["rev-parse", "main"]);

    let repo = Repo::discover(temp.path()).unwrap();
    let err = rewrite_branch(&repo, &sign_request(Boundary::Root, &test_signer)).unwrap_err();

    match rewrite_error(&err) {
        RewriteError::NonLinearHistory { commit, parents } => {
            assert_eq!(commit.to_string(), merge);
            assert_eq!(*parents, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), tip);
}

#[test]
fn dry_run_writes_nothing() {
    let temp = init_test_repo(&["one", "two"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let tip = git(temp.path(), &["rev-parse", "main"]);

    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .with_dry_run(true)
        .build();
    let outcome = rewrite_branch(&repo, &request).unwrap();

    assert!(outcome.dry_run);
    assert_eq!(outcome.range_len, 2);
    assert_eq!(git(temp.path(), &["rev-parse", "main"]), tip);
}

#[test]
fn rewritten_commits_are_readable_objects() {
    let temp = init_test_repo(&["one", "two"]);
    let repo = Repo::discover(temp.path()).unwrap();
    let outcome = rewrite_branch(&repo, &sign_request(Boundary::Root, &test_signer)).unwrap();

    for (_, new) in outcome.mapping.iter() {
        let commit = repo.read_commit(new).unwrap();
        assert!(commit.data.is_signed());
        assert_eq!(git(temp.path(), &["cat-file", "-t", &new.to_string()]), "commit");
    }
}
