// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use std::sync::atomic::{AtomicBool, Ordering};

fn checked_add() -> Intercept<(u32, u32), Option<u32>> {
    Intercept::wrapping("checked_add", |(a, b): (u32, u32)| a.checked_add(b))
}

#[test]
fn test_wrapping_without_substitute_passes_through() {
    let add = checked_add();

    assert_eq!(add.invoke((2, 3)).unwrap(), Some(5));
    assert_eq!(add.invoke((u32::MAX, 1)).unwrap(), None);

    let calls = add.log().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.behavior == Behavior::Delegated));
    assert_eq!(calls[1].ret, Some(None));
}

#[test]
fn test_substitute_fabricates_and_is_logged() {
    let add = checked_add();
    let _guard = add.returning(None);

    assert_eq!(add.invoke((1, 1)).unwrap(), None);

    let calls = add.log().calls();
    assert_eq!(calls[0].behavior, Behavior::Fabricated);
    assert_eq!(calls[0].args, (1, 1));
}

#[test]
fn test_substitute_active_only_inside_scope() {
    let add = checked_add();

    {
        let _guard = add.returning(Some(99));
        assert!(add.is_substituted());
        assert_eq!(add.invoke((1, 1)).unwrap(), Some(99));
    }

    assert!(!add.is_substituted());
    assert_eq!(add.invoke((1, 1)).unwrap(), Some(2));
}

#[test]
fn test_substitute_can_delegate_selectively() {
    let add = checked_add();
    let _guard = add.install(|&(a, _)| {
        if a == 0 {
            Reply::Fabricate(Some(0))
        } else {
            Reply::Delegate
        }
    });

    assert_eq!(add.invoke((0, 7)).unwrap(), Some(0));
    assert_eq!(add.invoke((4, 7)).unwrap(), Some(11));

    assert_eq!(add.log().fabricated().len(), 1);
    assert_eq!(add.log().delegated().len(), 1);
}

#[test]
fn test_nested_install_restores_previous() {
    let add = checked_add();
    let outer = add.returning(Some(1));
    {
        let _inner = add.returning(Some(2));
        assert_eq!(add.invoke((0, 0)).unwrap(), Some(2));
    }
    assert_eq!(add.invoke((0, 0)).unwrap(), Some(1));
    drop(outer);
    assert_eq!(add.invoke((5, 0)).unwrap(), Some(5));
}

#[test]
fn test_behavior_toggled_through_flag() {
    let fail = Arc::new(AtomicBool::new(false));
    let add = checked_add();
    let flag = Arc::clone(&fail);
    let _guard = add.install(move |_| {
        if flag.load(Ordering::SeqCst) {
            Reply::Fabricate(None)
        } else {
            Reply::Delegate
        }
    });

    assert_eq!(add.invoke((1, 2)).unwrap(), Some(3));
    fail.store(true, Ordering::SeqCst);
    assert_eq!(add.invoke((1, 2)).unwrap(), None);
}

#[test]
fn test_override_emulates_without_real() {
    let alloc = Intercept::overriding("malloc", |&(size,): &(usize,)| size != 0);

    assert_eq!(alloc.strategy(), Strategy::Override);
    assert!(alloc.invoke((16,)).unwrap());
    assert!(!alloc.invoke((0,)).unwrap());
    assert_eq!(alloc.log().len(), 2);
}

#[test]
fn test_override_delegation_is_unresolved() {
    let alloc = Intercept::overriding("malloc", |_: &(usize,)| true);
    let _guard = alloc.install(|_| Reply::Delegate);

    let err = alloc.invoke((8,)).unwrap_err();
    assert_eq!(
        err,
        InterceptError::NoRealImplementation {
            symbol: "malloc".to_string()
        }
    );

    let calls = alloc.log().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].behavior, Behavior::Unresolved);
    assert!(calls[0].ret.is_none());
}

#[test]
fn test_override_base_returns_after_scope() {
    let alloc = Intercept::overriding("malloc", |_: &(usize,)| true);
    {
        let _guard = alloc.returning(false);
        assert!(!alloc.invoke((8,)).unwrap());
    }
    assert!(alloc.invoke((8,)).unwrap());
}

#[test]
fn test_reset_clears_log_and_disarms_guards() {
    let add = checked_add();
    let guard = add.returning(Some(42));
    add.invoke((1, 1)).unwrap();

    add.reset();
    assert!(add.log().is_empty());
    assert!(!add.is_substituted());

    let _later = add.returning(Some(7));
    drop(guard);
    assert_eq!(add.invoke((1, 1)).unwrap(), Some(7));
}

#[test]
fn test_clones_share_slot_and_log() {
    let add = checked_add();
    let seam = add.clone();
    let _guard = add.returning(Some(0));

    assert_eq!(seam.invoke((3, 3)).unwrap(), Some(0));
    assert_eq!(add.log().len(), 1);
}

#[test]
fn test_debug_names_symbol() {
    let rendered = format!("{:?}", checked_add());
    assert!(rendered.contains("checked_add"));
    assert!(rendered.contains("Wrap"));
}

#[test]
fn test_outer_guard_dropped_first_does_not_resurface() {
    let add = checked_add();
    let outer = add.returning(Some(100));
    let inner = add.returning(Some(200));

    drop(outer);
    assert_eq!(add.invoke((1, 0)).unwrap(), Some(200));

    drop(inner);
    assert!(!add.is_substituted());
    assert_eq!(add.invoke((1, 0)).unwrap(), Some(1));
}

#[test]
fn test_fixture_holding_two_guards_restores_on_drop() {
    struct Fixture {
        _first: SubstituteGuard<(u32, u32), Option<u32>>,
        _second: SubstituteGuard<(u32, u32), Option<u32>>,
    }

    let add = checked_add();
    {
        let _fixture = Fixture {
            _first: add.returning(Some(10)),
            _second: add.returning(Some(20)),
        };
        assert_eq!(add.invoke((0, 0)).unwrap(), Some(20));
    }

    assert!(!add.is_substituted());
    assert_eq!(add.invoke((2, 2)).unwrap(), Some(4));
}

#[test]
fn test_middle_guard_dropped_keeps_innermost_active() {
    let add = checked_add();
    let first = add.returning(Some(1));
    let second = add.returning(Some(2));
    let third = add.returning(Some(3));

    drop(second);
    assert_eq!(add.invoke((0, 0)).unwrap(), Some(3));
    drop(third);
    assert_eq!(add.invoke((0, 0)).unwrap(), Some(1));
    drop(first);
    assert_eq!(add.invoke((0, 0)).unwrap(), Some(0));
}

#[test]
fn test_wrapping_logged_mirrors_calls_to_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checked_add.jsonl");
    let log = CallLog::with_file(&path).unwrap();
    let add = Intercept::wrapping_logged("checked_add", |(a, b): (u32, u32)| a.checked_add(b), log);

    add.invoke((2, 3)).unwrap();
    {
        let _guard = add.returning(None);
        add.invoke((4, 4)).unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["behavior"], "delegated");
    assert_eq!(lines[0]["args"], serde_json::json!([2, 3]));
    assert_eq!(lines[0]["ret"], 5);
    assert_eq!(lines[1]["seq"], 1);
    assert_eq!(lines[1]["behavior"], "fabricated");
    assert_eq!(add.log().len(), 2);
}

#[test]
fn test_overriding_logged_shares_the_given_log() {
    let log: CallLog<(usize,), bool> = CallLog::new();
    let alloc = Intercept::overriding_logged("malloc", |&(size,): &(usize,)| size != 0, log.clone());

    alloc.invoke((0,)).unwrap();

    assert_eq!(log.len(), 1);
    assert_eq!(log.fabricated().len(), 1);
}
