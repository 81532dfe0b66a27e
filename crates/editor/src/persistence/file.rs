use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::trace;
use vellum_primitives::{Artifact, ArtifactId};

use super::ArtifactStore;
use crate::error::PersistError;

/// Distinguishes temporary files of concurrent writes for the same record.
static NEXT_WRITE: AtomicU64 = AtomicU64::new(0);

/// Directory-backed store writing one JSON record per artifact.
///
/// Records are written to a temporary sibling and renamed into place, so a
/// reader never observes a partially written record.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Path of the record for `id`.
	pub fn record_path(&self, id: ArtifactId) -> PathBuf {
		self.dir.join(format!("{id}.json"))
	}

	/// Creates the store directory if it does not exist.
	pub async fn ensure_dir(&self) -> Result<(), PersistError> {
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|error| PersistError::Io {
				path: self.dir.clone(),
				error,
			})
	}

	/// Reads the record for `id`, if present.
	pub async fn read(&self, id: ArtifactId) -> Result<Option<Artifact>, PersistError> {
		let path = self.record_path(id);
		let bytes = match tokio::fs::read(&path).await {
			Ok(bytes) => bytes,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(error) => return Err(PersistError::Io { path, error }),
		};
		serde_json::from_slice(&bytes)
			.map(Some)
			.map_err(|error| PersistError::Encode { id, error })
	}
}

#[async_trait]
impl ArtifactStore for FileStore {
	async fn persist(&self, artifact: Artifact) -> Result<(), PersistError> {
		let id = artifact.id;
		let bytes = serde_json::to_vec_pretty(&artifact).map_err(|error| PersistError::Encode { id, error })?;

		let path = self.record_path(id);
		let seq = NEXT_WRITE.fetch_add(1, Ordering::Relaxed);
		let tmp = self.dir.join(format!(".{id}.{seq}.tmp"));
		tokio::fs::write(&tmp, &bytes)
			.await
			.map_err(|error| PersistError::Io {
				path: tmp.clone(),
				error,
			})?;
		tokio::fs::rename(&tmp, &path)
			.await
			.map_err(|error| PersistError::Io {
				path: path.clone(),
				error,
			})?;

		trace!(%id, path = %path.display(), bytes = bytes.len(), "file_store.write");
		Ok(())
	}
}
