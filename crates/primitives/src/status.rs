use std::fmt;

/// Whether the rendered preview has caught up with the live buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SyncStatus {
	/// The buffer holds edits that have not settled yet.
	Syncing,
	/// Buffer and stabilized content are identical.
	#[default]
	Synced,
}

impl SyncStatus {
	/// Derives the indicator from the live buffer and the stabilized copy.
	pub fn between(buffer: &str, stabilized: &str) -> Self {
		if buffer == stabilized {
			Self::Synced
		} else {
			Self::Syncing
		}
	}

	pub const fn is_synced(self) -> bool {
		matches!(self, Self::Synced)
	}
}

impl fmt::Display for SyncStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Syncing => "syncing",
			Self::Synced => "synced",
		})
	}
}
