use proptest::prelude::*;

use super::{MAX_SNAPSHOTS, SnapshotHistory};

#[test]
fn new_history_has_single_snapshot() {
	let history = SnapshotHistory::new("A");
	assert_eq!(history.entries(), ["A"]);
	assert_eq!(history.index(), 0);
	assert!(!history.can_undo());
	assert!(!history.can_redo());
}

#[test]
fn empty_content_seeds_single_empty_snapshot() {
	let history = SnapshotHistory::new("");
	assert_eq!(history.len(), 1);
	assert_eq!(history.current(), "");
	assert!(!history.is_empty());
}

#[test]
fn push_advances_cursor() {
	let mut history = SnapshotHistory::new("A");
	assert!(history.push("AB"));
	assert_eq!(history.entries(), ["A", "AB"]);
	assert_eq!(history.index(), 1);
	assert!(history.can_undo());
	assert!(!history.can_redo());
}

#[test]
fn duplicate_of_current_is_not_pushed() {
	let mut history = SnapshotHistory::new("A");
	history.push("AB");
	assert!(!history.push("AB"));
	assert_eq!(history.len(), 2);
}

#[test]
fn undo_redo_cycle_restores_content() {
	let mut history = SnapshotHistory::new("A");
	history.push("AB");

	assert_eq!(history.undo(), Some("A"));
	assert_eq!(history.index(), 0);
	assert_eq!(history.undo(), None);

	assert_eq!(history.redo(), Some("AB"));
	assert_eq!(history.index(), 1);
	assert_eq!(history.redo(), None);
}

#[test]
fn push_after_undo_discards_redo_branch() {
	let mut history = SnapshotHistory::new("A");
	history.push("AB");
	history.push("ABC");
	history.undo();
	history.undo();

	assert!(history.push("AX"));
	assert_eq!(history.entries(), ["A", "AX"]);
	assert!(!history.can_redo());
}

#[test]
fn duplicate_check_uses_cursor_not_top() {
	let mut history = SnapshotHistory::new("A");
	history.push("AB");
	history.undo();

	// Matches the top of the stack but not the cursor, so it is a new branch.
	assert!(history.push("AB"));
	assert_eq!(history.entries(), ["A", "AB"]);
	assert_eq!(history.index(), 1);
}

#[test]
fn overflow_evicts_oldest() {
	let mut history = SnapshotHistory::new("v0");
	for i in 1..=MAX_SNAPSHOTS + 10 {
		history.push(format!("v{i}"));
	}

	assert_eq!(history.len(), MAX_SNAPSHOTS);
	assert_eq!(history.index(), MAX_SNAPSHOTS - 1);
	assert_eq!(history.entries()[0], "v11");
	assert_eq!(history.current(), format!("v{}", MAX_SNAPSHOTS + 10));
}

#[test]
fn overflow_keeps_cursor_on_pushed_content() {
	let mut history = SnapshotHistory::with_capacity("a", 3);
	history.push("b");
	history.push("c");
	assert_eq!(history.index(), 2);

	history.push("d");
	assert_eq!(history.entries(), ["b", "c", "d"]);
	assert_eq!(history.index(), 2);
	assert_eq!(history.undo(), Some("c"));
}

#[test]
fn zero_capacity_is_clamped() {
	let mut history = SnapshotHistory::with_capacity("a", 0);
	history.push("b");
	assert_eq!(history.entries(), ["b"]);
	assert_eq!(history.index(), 0);
}

#[derive(Debug, Clone)]
enum Op {
	Push(String),
	Undo,
	Redo,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		3 => "[a-c]{0,2}".prop_map(Op::Push),
		1 => Just(Op::Undo),
		1 => Just(Op::Redo),
	]
}

proptest! {
	#[test]
	fn invariants_hold_under_random_ops(capacity in 1usize..8, ops in prop::collection::vec(op(), 0..64)) {
		let mut history = SnapshotHistory::with_capacity("", capacity);

		for op in ops {
			match op {
				Op::Push(text) => {
					let before = history.current().to_owned();
					let pushed = history.push(text.clone());
					prop_assert_eq!(pushed, before != text);
					prop_assert_eq!(history.current(), text.as_str());
					if pushed {
						prop_assert!(!history.can_redo());
					}
				}
				Op::Undo => {
					let index = history.index();
					let moved = history.undo().is_some();
					prop_assert_eq!(moved, index > 0);
				}
				Op::Redo => {
					let index = history.index();
					let len = history.len();
					let moved = history.redo().is_some();
					prop_assert_eq!(moved, index + 1 < len);
				}
			}

			prop_assert!(history.len() >= 1);
			prop_assert!(history.len() <= capacity);
			prop_assert!(history.index() < history.len());
			prop_assert_eq!(history.can_undo(), history.index() > 0);
			prop_assert_eq!(history.can_redo(), history.index() + 1 < history.len());
		}
	}

	#[test]
	fn undo_then_redo_is_identity(texts in prop::collection::vec("[a-z]{1,4}", 1..10)) {
		let mut history = SnapshotHistory::new("");
		for text in texts {
			history.push(text);
		}
		let before = history.current().to_owned();
		if history.undo().is_some() {
			prop_assert_eq!(history.redo(), Some(before.as_str()));
		}
	}
}
