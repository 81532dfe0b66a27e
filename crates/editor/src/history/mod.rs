//! Bounded snapshot history for undo/redo.
//!
//! [`SnapshotHistory`] stores full copies of buffer content with a cursor
//! (`index`) pointing at the snapshot the buffer was last restored to or
//! committed from. Undo and redo move the cursor; pushing truncates every
//! entry after it.
//!
//! # Invariants
//!
//! - The stack is never empty: it is seeded with the loaded content.
//! - `index < len()` at all times.
//! - `len() <= capacity()`; overflow evicts the oldest snapshot, so the
//!   cursor keeps pointing at the same content relative to the window.

#[cfg(test)]
mod tests;

use tracing::trace;

use crate::config::DEFAULT_HISTORY_CAPACITY;

/// Maximum undo history size.
pub const MAX_SNAPSHOTS: usize = DEFAULT_HISTORY_CAPACITY;

/// Undo/redo stack over buffer snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHistory {
	entries: Vec<String>,
	index: usize,
	capacity: usize,
}

impl SnapshotHistory {
	/// Creates a history seeded with `initial`, bounded at [`MAX_SNAPSHOTS`].
	pub fn new(initial: impl Into<String>) -> Self {
		Self::with_capacity(initial, MAX_SNAPSHOTS)
	}

	/// Creates a history seeded with `initial`. Capacity is clamped to at least one.
	pub fn with_capacity(initial: impl Into<String>, capacity: usize) -> Self {
		Self {
			entries: vec![initial.into()],
			index: 0,
			capacity: capacity.max(1),
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn index(&self) -> usize {
		self.index
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn entries(&self) -> &[String] {
		&self.entries
	}

	/// Snapshot at the cursor.
	pub fn current(&self) -> &str {
		&self.entries[self.index]
	}

	pub fn can_undo(&self) -> bool {
		self.index > 0
	}

	pub fn can_redo(&self) -> bool {
		self.index + 1 < self.entries.len()
	}

	/// Records `content` as the newest snapshot.
	///
	/// Entries after the cursor are discarded first. Content identical to the
	/// snapshot at the cursor is not recorded. Returns `true` if a snapshot
	/// was pushed.
	pub fn push(&mut self, content: impl Into<String>) -> bool {
		let content = content.into();
		if content == self.current() {
			trace!(index = self.index, "history.push_duplicate");
			return false;
		}

		let discarded = self.entries.len() - (self.index + 1);
		self.entries.truncate(self.index + 1);
		self.entries.push(content);

		let evicted = self.entries.len().saturating_sub(self.capacity);
		if evicted > 0 {
			self.entries.drain(..evicted);
		}
		self.index = self.entries.len() - 1;

		trace!(
			index = self.index,
			len = self.entries.len(),
			discarded,
			evicted,
			"history.push"
		);
		true
	}

	/// Moves the cursor back one snapshot and returns its content.
	pub fn undo(&mut self) -> Option<&str> {
		if !self.can_undo() {
			return None;
		}
		self.index -= 1;
		Some(self.current())
	}

	/// Moves the cursor forward one snapshot and returns its content.
	pub fn redo(&mut self) -> Option<&str> {
		if !self.can_redo() {
			return None;
		}
		self.index += 1;
		Some(self.current())
	}
}
