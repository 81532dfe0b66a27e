use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use vellum_primitives::{Artifact, ArtifactId};

use super::ArtifactStore;
use crate::error::PersistError;

/// In-process store keyed by artifact ID.
///
/// Keeps every call in order so embedders and tests can observe exactly what
/// the engine emitted.
#[derive(Debug, Default)]
pub struct MemoryStore {
	records: Mutex<HashMap<ArtifactId, Artifact>>,
	calls: Mutex<Vec<Artifact>>,
	rejecting: AtomicBool,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a record without counting it as a call.
	pub fn insert(&self, artifact: Artifact) {
		self.records.lock().insert(artifact.id, artifact);
	}

	pub fn get(&self, id: ArtifactId) -> Option<Artifact> {
		self.records.lock().get(&id).cloned()
	}

	/// Every artifact handed to [`ArtifactStore::persist`], oldest first.
	pub fn calls(&self) -> Vec<Artifact> {
		self.calls.lock().clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	/// Makes subsequent calls fail with [`PersistError::Rejected`].
	pub fn set_rejecting(&self, rejecting: bool) {
		self.rejecting.store(rejecting, Ordering::Relaxed);
	}
}

#[async_trait]
impl ArtifactStore for MemoryStore {
	async fn persist(&self, artifact: Artifact) -> Result<(), PersistError> {
		self.calls.lock().push(artifact.clone());
		if self.rejecting.load(Ordering::Relaxed) {
			return Err(PersistError::Rejected {
				id: artifact.id,
				reason: "store is read-only".into(),
			});
		}
		self.records.lock().insert(artifact.id, artifact);
		Ok(())
	}
}
