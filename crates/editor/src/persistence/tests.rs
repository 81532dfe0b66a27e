use std::sync::Arc;

use vellum_primitives::Artifact;

use super::*;

async fn drain_spawned() {
	for _ in 0..8 {
		tokio::task::yield_now().await;
	}
}

fn bridge(store: &Arc<MemoryStore>) -> (PersistenceBridge, Arc<EngineMetrics>) {
	let metrics = Arc::new(EngineMetrics::new());
	(PersistenceBridge::new(store.clone(), metrics.clone()), metrics)
}

#[tokio::test]
async fn unchanged_content_is_not_emitted() {
	let store = Arc::new(MemoryStore::new());
	let (bridge, metrics) = bridge(&store);
	let mut working = Artifact::new("page", "<p>a</p>");

	assert_eq!(bridge.sync(&mut working, "<p>a</p>"), None);
	drain_spawned().await;

	assert_eq!(store.call_count(), 0);
	assert_eq!(metrics.persist_count(), 0);
}

#[tokio::test]
async fn changed_content_updates_working_copy_and_store() {
	let store = Arc::new(MemoryStore::new());
	let (bridge, metrics) = bridge(&store);
	let mut working = Artifact::new("page", "<p>a</p>");
	let original = working.clone();

	let saved_at = bridge.sync(&mut working, "<p>b</p>").expect("content changed");
	assert_eq!(working.content, "<p>b</p>");
	assert_eq!(working.last_modified, saved_at);
	assert_eq!(working.id, original.id);

	drain_spawned().await;
	let calls = store.calls();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0], working);
	assert_eq!(store.get(original.id), Some(working.clone()));
	assert_eq!(metrics.persist_count(), 1);
}

#[tokio::test]
async fn repeated_sync_is_idempotent() {
	let store = Arc::new(MemoryStore::new());
	let (bridge, _) = bridge(&store);
	let mut working = Artifact::new("page", "");

	assert!(bridge.sync(&mut working, "x").is_some());
	assert!(bridge.sync(&mut working, "x").is_none());
	drain_spawned().await;

	assert_eq!(store.call_count(), 1);
}

#[tokio::test]
async fn store_failure_is_counted_not_propagated() {
	let store = Arc::new(MemoryStore::new());
	store.set_rejecting(true);
	let (bridge, metrics) = bridge(&store);
	let mut working = Artifact::new("page", "a");

	assert!(bridge.sync(&mut working, "ab").is_some());
	drain_spawned().await;

	assert_eq!(store.call_count(), 1);
	assert_eq!(store.get(working.id), None);
	assert_eq!(metrics.persist_failure_count(), 1);
	// The working copy still reflects the emitted content.
	assert_eq!(working.content, "ab");
}

#[tokio::test]
async fn file_store_writes_readable_records() {
	let dir = tempfile::tempdir().unwrap();
	let store = FileStore::new(dir.path().join("artifacts"));
	store.ensure_dir().await.unwrap();

	let artifact = Artifact::new("chart", "<canvas></canvas>");
	assert_eq!(store.read(artifact.id).await.unwrap(), None);

	store.persist(artifact.clone()).await.unwrap();
	assert!(store.record_path(artifact.id).exists());
	assert_eq!(store.read(artifact.id).await.unwrap(), Some(artifact.clone()));

	let revised = artifact.revised("<canvas id=\"c\"></canvas>", artifact.last_modified);
	store.persist(revised.clone()).await.unwrap();
	assert_eq!(store.read(artifact.id).await.unwrap(), Some(revised));

	let leftovers: Vec<_> = std::fs::read_dir(store.dir())
		.unwrap()
		.filter_map(Result::ok)
		.filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
		.collect();
	assert!(leftovers.is_empty());
}

#[tokio::test]
async fn file_store_reports_missing_directory() {
	let dir = tempfile::tempdir().unwrap();
	let store = FileStore::new(dir.path().join("never-created"));

	let err = store.persist(Artifact::new("x", "y")).await.unwrap_err();
	assert!(matches!(err, PersistError::Io { .. }));
}

/// Store whose first write stalls, so a later write would overtake it if
/// writes were not ordered.
struct StallFirstWrite {
	inner: MemoryStore,
	stalled: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl ArtifactStore for StallFirstWrite {
	async fn persist(&self, artifact: Artifact) -> Result<(), PersistError> {
		if !self.stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
			tokio::time::sleep(std::time::Duration::from_secs(5)).await;
		}
		self.inner.persist(artifact).await
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn slow_earlier_write_does_not_overwrite_later_one() {
	let store = Arc::new(StallFirstWrite {
		inner: MemoryStore::new(),
		stalled: std::sync::atomic::AtomicBool::new(false),
	});
	let bridge = PersistenceBridge::new(store.clone(), Arc::new(EngineMetrics::new()));
	let mut working = Artifact::new("page", "A");

	assert!(bridge.sync(&mut working, "AB").is_some());
	drain_spawned().await;
	assert!(bridge.sync(&mut working, "ABC").is_some());
	bridge.flush().await;

	let contents: Vec<String> = store.inner.calls().into_iter().map(|a| a.content).collect();
	assert_eq!(contents, ["AB", "ABC"]);
	assert_eq!(store.inner.get(working.id).map(|a| a.content).as_deref(), Some("ABC"));
}

#[tokio::test]
async fn flush_waits_for_queued_writes() {
	let store = Arc::new(MemoryStore::new());
	let (bridge, _) = bridge(&store);
	let mut working = Artifact::new("page", "");

	for n in 1..=5 {
		bridge.sync(&mut working, &format!("v{n}"));
	}
	bridge.flush().await;

	assert_eq!(store.call_count(), 5);
	assert_eq!(store.get(working.id).map(|a| a.content).as_deref(), Some("v5"));
}
