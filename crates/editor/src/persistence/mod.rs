//! Fire-and-forget persistence of stabilized content.
//!
//! The [`PersistenceBridge`] compares stabilized content against the working
//! copy's last persisted content and, when they differ, hands a full artifact
//! clone to an [`ArtifactStore`] through a queue drained by one worker task,
//! so writes reach the store in emit order. The working copy is updated
//! before the store call completes, so a second sync with the same content
//! is a no-op regardless of how the store fares.
//!
//! # Error Handling
//!
//! Store failures are logged and counted in [`EngineMetrics`]. They never
//! block or roll back local edits.

mod file;
mod memory;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use file::FileStore;
pub use memory::MemoryStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};
use vellum_primitives::Artifact;

use crate::error::PersistError;
use crate::metrics::EngineMetrics;

/// External owner of durable artifact records.
///
/// Implementations replace their record for `artifact.id` and must tolerate
/// repeated calls with identical content.
#[async_trait]
pub trait ArtifactStore: Send + Sync + 'static {
	async fn persist(&self, artifact: Artifact) -> Result<(), PersistError>;
}

/// Work queued for the store worker.
enum PersistJob {
	Write(Artifact),
	Flush(oneshot::Sender<()>),
}

/// Emits settled content to an [`ArtifactStore`].
///
/// Writes go through a single worker task, so the store sees them in the
/// order they were emitted. Must be created within a tokio runtime.
pub struct PersistenceBridge {
	jobs: mpsc::UnboundedSender<PersistJob>,
	metrics: Arc<EngineMetrics>,
}

impl std::fmt::Debug for PersistenceBridge {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PersistenceBridge").finish_non_exhaustive()
	}
}

impl PersistenceBridge {
	pub fn new(store: Arc<dyn ArtifactStore>, metrics: Arc<EngineMetrics>) -> Self {
		let (jobs, rx) = mpsc::unbounded_channel();
		tokio::spawn(run_worker(store, rx, metrics.clone()));
		Self { jobs, metrics }
	}

	/// Persists `content` if it differs from `working.content`.
	///
	/// On emit, `working` takes the new content and timestamp. Returns the
	/// save moment, or `None` when nothing changed.
	pub fn sync(&self, working: &mut Artifact, content: &str) -> Option<DateTime<Utc>> {
		if working.content == content {
			trace!(id = %working.id, "persist.unchanged");
			return None;
		}

		let saved_at = Utc::now();
		*working = working.revised(content, saved_at);
		self.emit(working.clone());
		Some(saved_at)
	}

	fn emit(&self, artifact: Artifact) {
		self.metrics.inc_persist();
		debug!(id = %artifact.id, bytes = artifact.content.len(), "persist.emit");
		if self.jobs.send(PersistJob::Write(artifact)).is_err() {
			self.metrics.inc_persist_failure();
			warn!("persist.worker_gone");
		}
	}

	/// Waits until every write emitted so far has completed.
	pub async fn flush(&self) {
		let (done, rx) = oneshot::channel();
		if self.jobs.send(PersistJob::Flush(done)).is_ok() {
			let _ = rx.await;
		}
	}
}

async fn run_worker(
	store: Arc<dyn ArtifactStore>,
	mut jobs: mpsc::UnboundedReceiver<PersistJob>,
	metrics: Arc<EngineMetrics>,
) {
	while let Some(job) = jobs.recv().await {
		match job {
			PersistJob::Write(artifact) => {
				let id = artifact.id;
				match store.persist(artifact).await {
					Ok(()) => trace!(%id, "persist.done"),
					Err(error) => {
						metrics.inc_persist_failure();
						warn!(%id, %error, "persist.failed");
					}
				}
			}
			PersistJob::Flush(done) => {
				let _ = done.send(());
			}
		}
	}
	trace!("persist.worker_exit");
}
