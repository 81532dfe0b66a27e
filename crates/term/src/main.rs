#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Vellum terminal driver.
//!
//! Loads one artifact file into an editing session, reads commands from
//! stdin, persists stabilized content to a directory store, and optionally
//! writes the sandboxed preview to a host page.

mod cli;
mod preview_file;
mod repl;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use preview_file::FilePreviewSandbox;
use tokio::io::BufReader;
use tracing::info;
use vellum_editor::{
	ArtifactStore, BufferController, EditorSession, EngineConfig, FileStore, HeadlessSandbox,
	PreviewSandbox,
};
use vellum_primitives::{Artifact, ResourceHandle};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => EngineConfig::load(path)
			.with_context(|| format!("loading config {}", path.display()))?,
		None => EngineConfig::default(),
	};

	let content = tokio::fs::read_to_string(&cli.file)
		.await
		.with_context(|| format!("reading {}", cli.file.display()))?;
	let artifact = Artifact::new(cli.artifact_name(), content)
		.with_reference(ResourceHandle::new(cli.file.display().to_string()));

	let store = Arc::new(FileStore::new(cli.store_dir()));
	store.ensure_dir().await?;

	let sandbox: Box<dyn PreviewSandbox> = match &cli.preview {
		Some(path) => Box::new(FilePreviewSandbox::new(path)),
		None => Box::new(HeadlessSandbox::new()),
	};

	info!(
		file = %cli.file.display(),
		store = %store.dir().display(),
		preview_delay = ?config.preview_delay,
		snapshot_delay = ?config.snapshot_delay,
		"vellum.start"
	);

	let controller = BufferController::new(config, store.clone(), sandbox);
	let (session, handle) = EditorSession::new(controller);
	let task = tokio::spawn(session.run());

	handle.load(artifact)?;
	repl::run(&handle, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

	handle.shutdown()?;
	let controller = task.await?;

	// Queued writes finish before the final buffer is written behind them.
	controller.flush_persistence().await;
	if let Some(artifact) = controller.export_buffer() {
		let path = store.record_path(artifact.id);
		store.persist(artifact).await?;
		info!(path = %path.display(), "vellum.flush");
	}

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("vellum_editor=trace,vellum_term=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
