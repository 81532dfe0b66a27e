//! Runtime metrics for observability.
//!
//! This module provides [`EngineMetrics`] for tracking persistence, history,
//! preview, and timer statistics. Counters are shared through an `Arc` so
//! spawned persistence tasks can report failures.

use std::sync::atomic::{AtomicU64, Ordering};

/// Runtime counters for one engine instance.
///
/// All counters use relaxed ordering - exact interleaving isn't critical,
/// but totals should be visible.
#[derive(Debug, Default)]
pub struct EngineMetrics {
	/// Total persistence calls handed to the store.
	pub persists_emitted: AtomicU64,
	/// Total persistence calls the store reported as failed.
	pub persist_failures: AtomicU64,
	/// Total snapshots pushed onto a history stack.
	pub snapshots_pushed: AtomicU64,
	/// Total sandbox contexts mounted by the preview renderer.
	pub preview_mounts: AtomicU64,
	/// Total timer firings discarded as stale.
	pub stale_firings: AtomicU64,
}

impl EngineMetrics {
	/// Creates a new metrics instance.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn inc_persist(&self) {
		self.persists_emitted.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_persist_failure(&self) {
		self.persist_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_snapshot(&self) {
		self.snapshots_pushed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_preview_mount(&self) {
		self.preview_mounts.fetch_add(1, Ordering::Relaxed);
	}

	pub fn inc_stale_firing(&self) {
		self.stale_firings.fetch_add(1, Ordering::Relaxed);
	}

	/// Returns the current persistence call count.
	pub fn persist_count(&self) -> u64 {
		self.persists_emitted.load(Ordering::Relaxed)
	}

	/// Returns the current persistence failure count.
	pub fn persist_failure_count(&self) -> u64 {
		self.persist_failures.load(Ordering::Relaxed)
	}

	/// Returns the current snapshot push count.
	pub fn snapshot_count(&self) -> u64 {
		self.snapshots_pushed.load(Ordering::Relaxed)
	}

	/// Returns the current preview mount count.
	pub fn preview_mount_count(&self) -> u64 {
		self.preview_mounts.load(Ordering::Relaxed)
	}

	/// Returns the current stale firing count.
	pub fn stale_firing_count(&self) -> u64 {
		self.stale_firings.load(Ordering::Relaxed)
	}

	/// Emits a summary event at debug level.
	pub fn log_summary(&self) {
		tracing::debug!(
			persists = self.persist_count(),
			persist_failures = self.persist_failure_count(),
			snapshots = self.snapshot_count(),
			preview_mounts = self.preview_mount_count(),
			stale_firings = self.stale_firing_count(),
			"metrics.summary"
		);
	}
}
