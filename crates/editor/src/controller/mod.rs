//! Buffer controller coordinating live text, history, preview, and persistence.
//!
//! [`BufferController`] exclusively owns the live buffer, the stabilized
//! copy, and the snapshot history of the loaded artifact. Mutations happen
//! only through its methods, on the task that owns it.
//!
//! # Flow
//!
//! ```text
//! edit/undo/redo ──► buffer ──► rearm both channels
//!                                   │
//!        preview_sync (Dp) ◄────────┤
//!          stabilized = buffer      │
//!          preview.render           │
//!          persistence.sync         │
//!                                   │
//!        snapshot_capture (Ds) ◄────┘
//!          provenance == User && buffer != history.current
//!            └► history.push
//! ```
//!
//! Timer firings arrive through the [`DebounceScheduler`] queue and are
//! applied by [`poll_timers`](BufferController::poll_timers),
//! [`settle`](BufferController::settle), or
//! [`on_timer`](BufferController::on_timer).


use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use vellum_primitives::{Artifact, ArtifactId, Provenance, SyncStatus};

use crate::config::EngineConfig;
use crate::debounce::{Channel, DebounceScheduler, TimerFired};
use crate::history::SnapshotHistory;
use crate::metrics::EngineMetrics;
use crate::persistence::{ArtifactStore, PersistenceBridge};
use crate::preview::{PreviewRenderer, PreviewSandbox};
use crate::provenance::ProvenanceGate;

/// Per-artifact state, replaced wholesale on load.
#[derive(Debug)]
struct LoadedArtifact {
	/// Working copy; `content` is the last content handed to the store.
	artifact: Artifact,
	buffer: String,
	stabilized: String,
	history: SnapshotHistory,
	last_saved_at: Option<DateTime<Utc>>,
}

/// Top-level coordinator of the editing engine.
///
/// Operations on a controller with nothing loaded are no-ops.
#[derive(Debug)]
pub struct BufferController {
	config: EngineConfig,
	scheduler: DebounceScheduler,
	gate: ProvenanceGate,
	persistence: PersistenceBridge,
	preview: PreviewRenderer,
	metrics: Arc<EngineMetrics>,
	state: Option<LoadedArtifact>,
}

impl BufferController {
	/// Creates an empty controller. Must be used within a tokio runtime.
	pub fn new(
		config: EngineConfig,
		store: Arc<dyn ArtifactStore>,
		sandbox: Box<dyn PreviewSandbox>,
	) -> Self {
		let metrics = Arc::new(EngineMetrics::new());
		Self {
			config,
			scheduler: DebounceScheduler::new(
				config.preview_delay,
				config.snapshot_delay,
				metrics.clone(),
			),
			gate: ProvenanceGate::new(),
			persistence: PersistenceBridge::new(store, metrics.clone()),
			preview: PreviewRenderer::new(sandbox, metrics.clone()),
			metrics,
			state: None,
		}
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn metrics(&self) -> &Arc<EngineMetrics> {
		&self.metrics
	}

	/// Replaces all state with `artifact`.
	///
	/// Pending timers are cancelled and their epoch retired before anything
	/// is reset, so no firing armed for a previous artifact can touch the new
	/// one.
	pub fn load(&mut self, artifact: Artifact) {
		let cancelled = self.scheduler.cancel_all();
		let epoch = self.scheduler.begin_epoch();
		self.gate.clear();

		debug!(
			id = %artifact.id,
			name = %artifact.name,
			bytes = artifact.content.len(),
			cancelled,
			epoch,
			"buffer.load"
		);

		self.preview.render(&artifact.content);
		let content = artifact.content.clone();
		self.state = Some(LoadedArtifact {
			buffer: content.clone(),
			stabilized: content.clone(),
			history: SnapshotHistory::with_capacity(content, self.config.history_capacity),
			last_saved_at: None,
			artifact,
		});
	}

	/// Unloads the artifact, cancelling pending timers and clearing the preview.
	pub fn reset(&mut self) {
		self.scheduler.begin_epoch();
		self.gate.clear();
		self.preview.clear();
		if let Some(state) = self.state.take() {
			debug!(id = %state.artifact.id, "buffer.reset");
		}
	}

	/// Replaces the buffer with user-typed text and re-arms both channels.
	///
	/// Every call restarts the channels, including one that reproduces the
	/// buffer. Returns `true` if the buffer changed.
	pub fn edit(&mut self, text: impl Into<String>) -> bool {
		let Some(state) = self.state.as_mut() else {
			debug!("buffer.edit_unloaded");
			return false;
		};
		let text = text.into();
		let changed = text != state.buffer;

		trace!(id = %state.artifact.id, bytes = text.len(), changed, "buffer.edit");
		if changed {
			state.buffer = text;
		}
		self.gate.mark(Provenance::User);
		self.scheduler.rearm_all();
		changed
	}

	/// Restores the previous snapshot. Returns `false` at the oldest snapshot.
	pub fn undo(&mut self) -> bool {
		self.restore(|history| history.undo().map(str::to_owned), "undo")
	}

	/// Restores the next snapshot. Returns `false` at the newest snapshot.
	pub fn redo(&mut self) -> bool {
		self.restore(|history| history.redo().map(str::to_owned), "redo")
	}

	fn restore(
		&mut self,
		step: impl FnOnce(&mut SnapshotHistory) -> Option<String>,
		direction: &'static str,
	) -> bool {
		let Some(state) = self.state.as_mut() else {
			return false;
		};
		let Some(content) = step(&mut state.history) else {
			trace!(
				direction,
				index = state.history.index(),
				len = state.history.len(),
				"buffer.restore_noop"
			);
			return false;
		};

		self.gate.mark(Provenance::History);
		state.buffer = content;
		self.scheduler.rearm_all();
		debug!(
			id = %state.artifact.id,
			index = state.history.index(),
			len = state.history.len(),
			direction,
			"buffer.restore"
		);
		true
	}

	/// Stabilizes and persists the buffer immediately.
	///
	/// Pending timers stay armed; when they fire they find nothing to do.
	/// Returns the save moment if the store was called.
	pub fn manual_save(&mut self) -> Option<DateTime<Utc>> {
		let saved_at = self.stabilize();
		debug!(saved = saved_at.is_some(), "buffer.manual_save");
		saved_at
	}

	/// Waits until every store write emitted so far has completed.
	pub async fn flush_persistence(&self) {
		self.persistence.flush().await;
	}

	/// Applies every queued firing that is still current.
	///
	/// Returns the number of channels applied.
	pub fn poll_timers(&mut self) -> usize {
		let mut applied = 0;
		while let Some(channel) = self.scheduler.try_next() {
			self.apply(channel);
			applied += 1;
		}
		applied
	}

	/// Waits for and applies firings until no channel is armed.
	///
	/// Returns the number of channels applied.
	pub async fn settle(&mut self) -> usize {
		let mut applied = 0;
		while let Some(channel) = self.scheduler.next().await {
			self.apply(channel);
			applied += 1;
		}
		applied
	}

	/// Waits for the next raw firing, for callers running their own loop.
	///
	/// Pends forever while nothing is armed; pass the result to
	/// [`on_timer`](Self::on_timer).
	pub async fn next_timer(&mut self) -> TimerFired {
		self.scheduler.recv().await
	}

	/// Applies a firing if it is still current. Returns `true` if applied.
	pub fn on_timer(&mut self, fired: TimerFired) -> bool {
		match self.scheduler.accept(fired) {
			Some(channel) => {
				self.apply(channel);
				true
			}
			None => false,
		}
	}

	fn apply(&mut self, channel: Channel) {
		match channel {
			Channel::PreviewSync => {
				self.stabilize();
			}
			Channel::SnapshotCapture => self.capture_snapshot(),
		}
	}

	/// Copies the buffer into stabilized content, renders it, and persists it
	/// if it differs from the working copy.
	fn stabilize(&mut self) -> Option<DateTime<Utc>> {
		let state = self.state.as_mut()?;
		state.stabilized.clone_from(&state.buffer);
		self.preview.render(&state.stabilized);

		let saved_at = self.persistence.sync(&mut state.artifact, &state.stabilized)?;
		state.last_saved_at = Some(saved_at);
		Some(saved_at)
	}

	fn capture_snapshot(&mut self) {
		let provenance = self.gate.take();
		let Some(state) = self.state.as_mut() else {
			return;
		};
		if !provenance.is_snapshot_worthy() {
			trace!(?provenance, index = state.history.index(), "history.skip");
			return;
		}
		if state.history.push(state.buffer.clone()) {
			self.metrics.inc_snapshot();
			debug!(
				id = %state.artifact.id,
				index = state.history.index(),
				len = state.history.len(),
				"history.capture"
			);
		}
	}

	pub fn is_loaded(&self) -> bool {
		self.state.is_some()
	}

	pub fn artifact_id(&self) -> Option<ArtifactId> {
		self.state.as_ref().map(|state| state.artifact.id)
	}

	/// Working copy of the artifact as last handed to the store.
	pub fn artifact(&self) -> Option<&Artifact> {
		self.state.as_ref().map(|state| &state.artifact)
	}

	/// Live buffer text.
	pub fn buffer(&self) -> Option<&str> {
		self.state.as_ref().map(|state| state.buffer.as_str())
	}

	/// Debounce-settled text shown in the preview.
	pub fn stabilized(&self) -> Option<&str> {
		self.state.as_ref().map(|state| state.stabilized.as_str())
	}

	/// Artifact clone carrying the live buffer, for export.
	///
	/// Reads the buffer rather than stabilized content so typed but unsettled
	/// edits are included.
	pub fn export_buffer(&self) -> Option<Artifact> {
		let state = self.state.as_ref()?;
		Some(state.artifact.revised(state.buffer.clone(), Utc::now()))
	}

	pub fn history(&self) -> Option<&SnapshotHistory> {
		self.state.as_ref().map(|state| &state.history)
	}

	pub fn history_len(&self) -> usize {
		self.history().map_or(0, SnapshotHistory::len)
	}

	pub fn history_index(&self) -> usize {
		self.history().map_or(0, SnapshotHistory::index)
	}

	pub fn can_undo(&self) -> bool {
		self.history().is_some_and(SnapshotHistory::can_undo)
	}

	pub fn can_redo(&self) -> bool {
		self.history().is_some_and(SnapshotHistory::can_redo)
	}

	pub fn sync_status(&self) -> SyncStatus {
		self.state.as_ref().map_or(SyncStatus::Synced, |state| {
			SyncStatus::between(&state.buffer, &state.stabilized)
		})
	}

	/// Moment of the last store call since load. Display only.
	pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
		self.state.as_ref().and_then(|state| state.last_saved_at)
	}

	/// Returns `true` if a debounce channel is still waiting to fire.
	pub fn has_pending_timers(&self) -> bool {
		self.scheduler.has_armed()
	}
}
