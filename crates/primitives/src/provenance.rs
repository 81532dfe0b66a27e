/// Origin of a buffer mutation.
///
/// User edits feed the snapshot history. History restores (undo/redo) must
/// not, or every undo would be recorded as a fresh edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Provenance {
	/// Typed, pasted, or otherwise produced by the user.
	#[default]
	User,
	/// Restored from the snapshot history.
	History,
}

impl Provenance {
	/// Returns `true` if settling this mutation may record a snapshot.
	pub const fn is_snapshot_worthy(self) -> bool {
		matches!(self, Self::User)
	}
}
