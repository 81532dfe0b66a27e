//! Single-shot provenance tag for the snapshot-capture channel.

use tracing::trace;
use vellum_primitives::Provenance;

/// Holds the provenance of the latest buffer mutation until the
/// snapshot-capture channel consumes it.
///
/// Every mutation overwrites the tag, so the capture that settles a burst
/// sees the origin of its final mutation. Consuming the tag resets it to
/// [`Provenance::User`].
#[derive(Debug, Default)]
pub struct ProvenanceGate {
	pending: Provenance,
}

impl ProvenanceGate {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tags the mutation that is about to be applied.
	pub fn mark(&mut self, provenance: Provenance) {
		if provenance != self.pending {
			trace!(from = ?self.pending, to = ?provenance, "provenance.mark");
		}
		self.pending = provenance;
	}

	/// Reads and clears the tag.
	pub fn take(&mut self) -> Provenance {
		std::mem::take(&mut self.pending)
	}

	pub fn peek(&self) -> Provenance {
		self.pending
	}

	/// Drops any tag left by a previous artifact.
	pub fn clear(&mut self) {
		self.pending = Provenance::User;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn take_resets_to_user() {
		let mut gate = ProvenanceGate::new();
		gate.mark(Provenance::History);
		assert_eq!(gate.take(), Provenance::History);
		assert_eq!(gate.take(), Provenance::User);
	}

	#[test]
	fn latest_mark_wins() {
		let mut gate = ProvenanceGate::new();
		gate.mark(Provenance::History);
		gate.mark(Provenance::User);
		assert_eq!(gate.take(), Provenance::User);

		gate.mark(Provenance::User);
		gate.mark(Provenance::History);
		assert_eq!(gate.peek(), Provenance::History);
		gate.clear();
		assert_eq!(gate.take(), Provenance::User);
	}
}
