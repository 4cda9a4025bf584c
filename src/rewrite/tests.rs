// tiny-git-tools: Git history maintenance tools
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use gix::ObjectId;
use gix::bstr::{BString, ByteSlice};

use super::{
    Boundary, CommitRange, NewIdentity, RewriteRequest, Transform, resolve_range, rewrite_branch,
    rewrite_commits, validate_linear,
};
use crate::error::{GitError, GixError, RewriteError, TgtError, TgtResult};
use crate::git::{BranchRefs, Commit, CommitData, CommitGraph, Identity};
use crate::signing::{CommitSigner, HeaderPresence};

// --- in-memory object store ---

fn id_for(n: usize) -> ObjectId {
    ObjectId::from_hex(format!("{n:040x}").as_bytes()).expect("valid hex")
}

/// Content-addressed enough for the engine: equal bytes give equal ids.
#[derive(Default)]
struct MemoryRepo {
    objects: RefCell<HashMap<ObjectId, CommitData>>,
    by_content: RefCell<HashMap<Vec<u8>, ObjectId>>,
    branches: RefCell<HashMap<String, ObjectId>>,
    writes: Cell<usize>,
    /// Moves a branch right after the first object write.
    race: RefCell<Option<(String, ObjectId)>>,
}

impl MemoryRepo {
    fn insert(&self, data: CommitData) -> ObjectId {
        let bytes = data.to_bytes();
        if let Some(id) = self.by_content.borrow().get(&bytes) {
            return *id;
        }
        let id = id_for(self.by_content.borrow().len() + 1);
        self.by_content.borrow_mut().insert(bytes, id);
        self.objects.borrow_mut().insert(id, data);
        id
    }

    fn set_branch(&self, name: &str, id: ObjectId) {
        self.branches.borrow_mut().insert(name.to_string(), id);
    }

    fn data(&self, id: ObjectId) -> CommitData {
        self.objects.borrow()[&id].clone()
    }

    fn tip(&self, name: &str) -> ObjectId {
        self.branches.borrow()[name]
    }

    /// First-parent history from `tip`, oldest first.
    fn history(&self, tip: ObjectId) -> Vec<ObjectId> {
        let mut ids = vec![tip];
        while let Some(parent) = self.data(ids[ids.len() - 1]).parents.first().copied() {
            ids.push(parent);
        }
        ids.reverse();
        ids
    }

    fn ancestors(&self, start: ObjectId) -> Vec<ObjectId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(data) = self.objects.borrow().get(&id) {
                queue.extend(data.parents.iter().copied());
            }
        }
        order
    }
}

impl CommitGraph for MemoryRepo {
    fn read_commit(&self, id: ObjectId) -> TgtResult<Commit> {
        let data = self.objects.borrow().get(&id).cloned().ok_or_else(|| {
            GitError::Gix(GixError::FindObject {
                id,
                message: "not in memory store".to_string(),
            })
        })?;
        Ok(Commit { id, data })
    }

    fn write_commit(&self, data: &CommitData) -> TgtResult<ObjectId> {
        let id = self.insert(data.clone());
        self.writes.set(self.writes.get() + 1);
        if let Some((branch, target)) = self.race.borrow_mut().take() {
            self.set_branch(&branch, target);
        }
        Ok(id)
    }

    fn resolve_revision(&self, rev: &str) -> TgtResult<Option<ObjectId>> {
        Ok(self.branches.borrow().get(rev).copied())
    }

    fn merge_base(&self, one: ObjectId, two: ObjectId) -> TgtResult<Option<ObjectId>> {
        let reachable: HashSet<_> = self.ancestors(one).into_iter().collect();
        Ok(self
            .ancestors(two)
            .into_iter()
            .find(|id| reachable.contains(id)))
    }
}

impl BranchRefs for MemoryRepo {
    fn branch_tip(&self, branch: &str) -> TgtResult<ObjectId> {
        self.branches.borrow().get(branch).copied().ok_or_else(|| {
            GitError::BranchNotFound {
                branch: branch.to_string(),
            }
            .into()
        })
    }

    fn compare_and_set(
        &self,
        branch: &str,
        expected: ObjectId,
        new: ObjectId,
        _message: &str,
    ) -> TgtResult<()> {
        let actual = self.branch_tip(branch)?;
        if actual != expected {
            return Err(RewriteError::ConcurrentModification {
                branch: branch.to_string(),
                expected,
                actual: actual.to_string(),
            }
            .into());
        }
        self.set_branch(branch, new);
        Ok(())
    }
}

// --- fixtures ---

fn identity(name: &str, time: &str) -> Identity {
    Identity::new(name, format!("{}@example.com", name.to_lowercase()), time)
}

fn commit_data(parents: Vec<ObjectId>, message: &str, signed: bool) -> CommitData {
    let mut data = CommitData {
        tree: id_for(0xee00 + message.len()),
        parents,
        author: identity("Original", "1700000000 +0200"),
        committer: identity("Committer", "1700000100 +0200"),
        encoding: None,
        extra_headers: Vec::new(),
        message: BString::from(format!("{message}\n")),
    };
    if signed {
        data.set_signature("-----BEGIN PGP SIGNATURE-----\nold\n-----END PGP SIGNATURE-----");
    }
    data
}

/// `main` with one commit per entry of `signed`, oldest first.
fn linear_repo(signed: &[bool]) -> (MemoryRepo, Vec<ObjectId>) {
    let repo = MemoryRepo::default();
    let mut ids = Vec::new();
    for (i, &is_signed) in signed.iter().enumerate() {
        let parents = ids.last().copied().into_iter().collect();
        ids.push(repo.insert(commit_data(parents, &format!("C{}", i + 1), is_signed)));
    }
    if let Some(tip) = ids.last() {
        repo.set_branch("main", *tip);
    }
    (repo, ids)
}

fn test_signer(payload: &[u8]) -> TgtResult<BString> {
    Ok(BString::from(format!(
        "-----BEGIN TEST SIGNATURE-----\n{}\n-----END TEST SIGNATURE-----\n",
        payload.len()
    )))
}

fn failing_signer(_: &[u8]) -> TgtResult<BString> {
    Err(RewriteError::signing_unavailable("no signing key configured").into())
}

fn new_author() -> NewIdentity {
    NewIdentity::new("New Name", "new@example.com").expect("valid identity")
}

fn rewrite_error(err: TgtError) -> RewriteError {
    match err {
        TgtError::Rewrite(inner) => *inner,
        other => panic!("expected rewrite error, got {other:?}"),
    }
}

// --- identity rewrite ---

#[test]
fn test_identity_rewrite_replaces_author_and_keeps_content() {
    let (repo, original) = linear_repo(&[false, false, false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: new_author(),
            committer: Some(new_author()),
            signer: None,
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("rewrite");

    assert_eq!(outcome.mapping.len(), 3);
    assert_eq!(outcome.mapping.rewritten_count(), 3);
    assert_eq!(outcome.boundary, None);
    assert!(outcome.changed());
    assert_eq!(repo.tip("main"), outcome.new_tip);

    let rewritten = repo.history(outcome.new_tip);
    assert_eq!(rewritten.len(), 3);
    for (old, new) in original.iter().zip(&rewritten) {
        assert_ne!(old, new);
        assert_eq!(outcome.mapping.get(*old), Some(*new));
        let before = repo.data(*old);
        let after = repo.data(*new);
        assert_eq!(after.tree, before.tree);
        assert_eq!(after.message, before.message);
        assert_eq!(after.author.name(), "New Name");
        assert_eq!(after.author.email(), "new@example.com");
        assert_eq!(after.author.time(), before.author.time());
        assert_eq!(after.committer.name(), "New Name");
        assert_eq!(after.committer.time(), before.committer.time());
    }
}

#[test]
fn test_identity_rewrite_can_preserve_committer() {
    let (repo, original) = linear_repo(&[false, false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: new_author(),
            committer: None,
            signer: None,
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("rewrite");
    let tip = repo.data(outcome.new_tip);
    assert_eq!(tip.author.name(), "New Name");
    assert_eq!(tip.committer, repo.data(original[1]).committer);
}

#[test]
fn test_identity_rewrite_drops_stale_signatures() {
    let (repo, _) = linear_repo(&[true, true]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: new_author(),
            committer: None,
            signer: None,
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("rewrite");
    for id in repo.history(outcome.new_tip) {
        assert!(!repo.data(id).is_signed());
    }
}

#[test]
fn test_identity_rewrite_with_signing() {
    let (repo, _) = linear_repo(&[false, false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: new_author(),
            committer: None,
            signer: Some(&test_signer),
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("rewrite");
    for id in repo.history(outcome.new_tip) {
        let data = repo.data(id);
        assert_eq!(data.author.name(), "New Name");
        assert!(data.is_signed());
    }
}

// --- signing rewrite ---

#[test]
fn test_sign_three_unsigned_commits() {
    let (repo, original) = linear_repo(&[false, false, false]);
    let old_tip = repo.tip("main");
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .with_skip_signed(&HeaderPresence)
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("sign");

    assert_eq!(outcome.old_tip, old_tip);
    assert_ne!(outcome.new_tip, old_tip);
    assert_eq!(repo.tip("main"), outcome.new_tip);

    let rewritten = repo.history(outcome.new_tip);
    assert_eq!(rewritten.len(), 3);
    for (old, new) in original.iter().zip(&rewritten) {
        let before = repo.data(*old);
        let after = repo.data(*new);
        assert!(after.is_signed());
        assert_eq!(after.tree, before.tree);
        assert_eq!(after.author, before.author);
        assert_eq!(after.committer, before.committer);
        assert_eq!(after.message, before.message);
    }
}

#[test]
fn test_signature_covers_new_parent() {
    let (repo, _) = linear_repo(&[false, false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("sign");
    let tip = repo.data(outcome.new_tip);
    let mut expected = test_signer(&tip.signing_payload()).expect("sign payload");
    expected.pop();
    assert_eq!(tip.signature(), Some(expected.as_bstr()));
}

#[test]
fn test_signed_commits_with_unchanged_parent_pass_through() {
    let (repo, original) = linear_repo(&[true, false, true]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .with_skip_signed(&HeaderPresence)
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("sign");

    // C1 kept, C2 signed, C3 re-signed because its parent changed.
    assert_eq!(outcome.mapping.get(original[0]), Some(original[0]));
    assert_ne!(outcome.mapping.get(original[1]), Some(original[1]));
    assert_ne!(outcome.mapping.get(original[2]), Some(original[2]));
    assert_eq!(outcome.mapping.passed_through_count(), 1);
    assert_eq!(outcome.mapping.rewritten_count(), 2);

    let rewritten = repo.history(outcome.new_tip);
    assert_eq!(rewritten[0], original[0]);
    assert_eq!(repo.data(rewritten[2]).parents, vec![rewritten[1]]);
}

#[test]
fn test_signing_twice_changes_nothing() {
    let (repo, _) = linear_repo(&[false, false, false]);
    let build = || {
        RewriteRequest::builder()
            .branch("main")
            .transform(Transform::Sign {
                signer: &test_signer,
            })
            .with_skip_signed(&HeaderPresence)
            .build()
    };

    let first = rewrite_branch(&repo, &build()).expect("first run");
    let writes = repo.writes.get();
    let second = rewrite_branch(&repo, &build()).expect("second run");

    assert_eq!(second.old_tip, first.new_tip);
    assert_eq!(second.new_tip, first.new_tip);
    assert!(!second.changed());
    assert_eq!(second.mapping.rewritten_count(), 0);
    assert_eq!(second.mapping.passed_through_count(), 3);
    assert_eq!(repo.writes.get(), writes);
}

#[test]
fn test_signed_ancestor_boundary() {
    let (repo, original) = linear_repo(&[true, false, false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .with_boundary(Boundary::SignedAncestor)
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .with_skip_signed(&HeaderPresence)
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("sign");
    assert_eq!(outcome.boundary, Some(original[0]));
    assert_eq!(outcome.range_len, 2);

    let again = rewrite_branch(&repo, &request).expect_err("nothing left");
    assert!(again.is_nothing_to_rewrite());
    assert_eq!(repo.tip("main"), outcome.new_tip);
}

#[test]
fn test_signing_failure_leaves_branch_untouched() {
    let (repo, _) = linear_repo(&[false, false]);
    let old_tip = repo.tip("main");
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &failing_signer,
        })
        .build();

    let err = rewrite_error(rewrite_branch(&repo, &request).expect_err("no key"));
    assert!(matches!(err, RewriteError::SigningUnavailable { .. }));
    assert_eq!(repo.tip("main"), old_tip);
}

#[test]
fn test_failure_mid_range_exposes_nothing() {
    let (repo, _) = linear_repo(&[false, false, false]);
    let old_tip = repo.tip("main");
    let calls = Cell::new(0);
    let flaky = |payload: &[u8]| -> TgtResult<BString> {
        calls.set(calls.get() + 1);
        if calls.get() == 3 {
            failing_signer(payload)
        } else {
            test_signer(payload)
        }
    };
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign { signer: &flaky })
        .build();

    assert!(rewrite_branch(&repo, &request).is_err());
    assert_eq!(repo.writes.get(), 2);
    assert_eq!(repo.tip("main"), old_tip);
}

// --- validation and boundaries ---

#[test]
fn test_merge_in_range_is_rejected() {
    let repo = MemoryRepo::default();
    let c1 = repo.insert(commit_data(vec![], "C1", false));
    let side = repo.insert(commit_data(vec![c1], "side", false));
    let c2 = repo.insert(commit_data(vec![c1], "C2", false));
    let merge = repo.insert(commit_data(vec![c2, side], "merge", false));
    let c3 = repo.insert(commit_data(vec![merge], "C3", false));
    repo.set_branch("main", c3);

    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Identity {
            author: new_author(),
            committer: None,
            signer: None,
        })
        .build();

    let err = rewrite_error(rewrite_branch(&repo, &request).expect_err("merge"));
    match err {
        RewriteError::NonLinearHistory { commit, parents } => {
            assert_eq!(commit, merge);
            assert_eq!(parents, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.tip("main"), c3);
    assert_eq!(repo.writes.get(), 0);
}

#[test]
fn test_concurrent_branch_move_is_detected() {
    let (repo, _) = linear_repo(&[false, false]);
    let t0 = repo.tip("main");
    let t1 = repo.insert(commit_data(vec![t0], "pushed elsewhere", false));
    *repo.race.borrow_mut() = Some(("main".to_string(), t1));

    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .build();

    let err = rewrite_error(rewrite_branch(&repo, &request).expect_err("race"));
    match err {
        RewriteError::ConcurrentModification {
            branch,
            expected,
            actual,
        } => {
            assert_eq!(branch, "main");
            assert_eq!(expected, t0);
            assert_eq!(actual, t1.to_string());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.tip("main"), t1);
}

#[test]
fn test_merge_base_boundary_limits_range() {
    let (repo, original) = linear_repo(&[false, false]);
    let f1 = repo.insert(commit_data(vec![original[1]], "F1", false));
    let f2 = repo.insert(commit_data(vec![f1], "F2", false));
    repo.set_branch("feature", f2);

    let request = RewriteRequest::builder()
        .branch("feature")
        .with_boundary(Boundary::MergeBase("main".to_string()))
        .transform(Transform::Identity {
            author: new_author(),
            committer: None,
            signer: None,
        })
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("rewrite");
    assert_eq!(outcome.boundary, Some(original[1]));
    assert_eq!(outcome.mapping.len(), 2);
    let history = repo.history(outcome.new_tip);
    assert_eq!(&history[..2], &original[..]);
    assert_eq!(repo.tip("main"), original[1]);
}

#[test]
fn test_unknown_boundary_reference() {
    let (repo, _) = linear_repo(&[false]);
    let err = resolve_range(
        &repo,
        "main",
        repo.tip("main"),
        &Boundary::MergeBase("upstream/main".to_string()),
        None,
    )
    .expect_err("unknown ref");
    match rewrite_error(err) {
        RewriteError::BoundaryNotFound { reference, .. } => {
            assert_eq!(reference, "upstream/main");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unrelated_boundary_has_no_merge_base() {
    let (repo, _) = linear_repo(&[false]);
    let orphan = repo.insert(commit_data(vec![], "orphan", false));
    repo.set_branch("orphan", orphan);

    let err = resolve_range(
        &repo,
        "main",
        repo.tip("main"),
        &Boundary::MergeBase("orphan".to_string()),
        None,
    )
    .expect_err("unrelated");
    assert!(matches!(
        rewrite_error(err),
        RewriteError::BoundaryNotFound { .. }
    ));
}

#[test]
fn test_tip_equal_to_boundary_is_nothing_to_rewrite() {
    let (repo, _) = linear_repo(&[false, false]);
    repo.set_branch("upstream", repo.tip("main"));

    let err = resolve_range(
        &repo,
        "main",
        repo.tip("main"),
        &Boundary::MergeBase("upstream".to_string()),
        None,
    )
    .expect_err("empty range");
    assert!(err.is_nothing_to_rewrite());
}

#[test]
fn test_single_commit_range_is_valid() {
    let (repo, original) = linear_repo(&[false]);
    let range = resolve_range(&repo, "main", original[0], &Boundary::Root, None)
        .expect("range");
    assert_eq!(range.len(), 1);
    assert!(validate_linear(&range).is_ok());
}

#[test]
fn test_validate_linear_reports_first_merge() {
    let a = Commit {
        id: id_for(1),
        data: commit_data(vec![], "a", false),
    };
    let merge = Commit {
        id: id_for(2),
        data: commit_data(vec![id_for(1), id_for(9)], "m", false),
    };
    let range = CommitRange {
        branch: "main".to_string(),
        boundary: None,
        commits: vec![a, merge],
    };
    match rewrite_error(validate_linear(&range).expect_err("merge")) {
        RewriteError::NonLinearHistory { commit, .. } => assert_eq!(commit, id_for(2)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rewrite_commits_empty_range_names_branch() {
    let (repo, _) = linear_repo(&[false]);
    let range = CommitRange {
        branch: "feature".to_string(),
        boundary: None,
        commits: Vec::new(),
    };
    let transform = Transform::Sign {
        signer: &test_signer,
    };

    let err = rewrite_commits(&repo, &range, &transform, None).expect_err("empty range");
    match rewrite_error(err) {
        RewriteError::NoCommitsToRewrite { branch } => assert_eq!(branch, "feature"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.writes.get(), 0);
}

#[test]
fn test_dry_run_writes_nothing() {
    let (repo, _) = linear_repo(&[false, false]);
    let old_tip = repo.tip("main");
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .with_dry_run(true)
        .build();

    let outcome = rewrite_branch(&repo, &request).expect("dry run");
    assert!(outcome.dry_run);
    assert_eq!(outcome.range_len, 2);
    assert_eq!(outcome.new_tip, old_tip);
    assert_eq!(repo.writes.get(), 0);
    assert_eq!(outcome.to_string(), "main: would rewrite 2 commit(s) above the root");
}

// --- transform ---

#[test]
fn test_transform_does_not_touch_input() {
    let original = Commit {
        id: id_for(7),
        data: commit_data(vec![id_for(6)], "msg", true),
    };
    let snapshot = original.clone();
    let transform = Transform::Identity {
        author: new_author(),
        committer: None,
        signer: None,
    };

    let data = transform.apply(&original, Some(id_for(8))).expect("apply");
    assert_eq!(original, snapshot);
    assert_eq!(data.parents, vec![id_for(8)]);
    assert!(!data.is_signed());
    assert_eq!(transform.label(), "change-author");
}

#[test]
fn test_transform_keeps_root_commit_parentless() {
    let original = Commit {
        id: id_for(7),
        data: commit_data(vec![], "root", false),
    };
    let transform = Transform::Sign {
        signer: &test_signer,
    };
    let data = transform.apply(&original, None).expect("apply");
    assert!(data.parents.is_empty());
    assert!(data.is_signed());
    assert_eq!(transform.label(), "sign");
}

#[test]
fn test_new_identity_validation() {
    assert!(NewIdentity::new("Jane Doe", "jane@example.com").is_ok());
    assert!(NewIdentity::new("  ", "jane@example.com").is_err());
    assert!(NewIdentity::new("Jane", "jane.example.com").is_err());
    assert!(NewIdentity::new("Jane", "jane@exa mple.com").is_err());
    assert!(NewIdentity::new("Jane", "<jane@example.com>").is_err());

    let identity = NewIdentity::new(" Jane ", " jane@example.com ").expect("trimmed");
    assert_eq!(identity.to_string(), "Jane <jane@example.com>");
}

#[test]
fn test_report_serializes_mapping() {
    let (repo, original) = linear_repo(&[false]);
    let request = RewriteRequest::builder()
        .branch("main")
        .transform(Transform::Sign {
            signer: &test_signer,
        })
        .build();
    let outcome = rewrite_branch(&repo, &request).expect("sign");

    let report = serde_json::to_value(outcome.report()).expect("json");
    assert_eq!(report["branch"], "main");
    assert_eq!(report["old_tip"], original[0].to_string());
    assert_eq!(report["new_tip"], outcome.new_tip.to_string());
    assert_eq!(report["rewritten"], 1);
    assert_eq!(report["passed_through"], 0);
    assert!(report.get("boundary").is_none());
    assert_eq!(report["mapping"][0]["old"], original[0].to_string());
}

#[test]
fn test_closure_signer_is_a_commit_signer() {
    let signer: &dyn CommitSigner = &test_signer;
    assert!(signer.sign(b"x").is_ok());
}
