use std::sync::Arc;

use parking_lot::Mutex;

use super::{PreviewDocument, PreviewKey};

/// Isolated execution context hosting previewed content.
///
/// `mount` is only called after any previous context was torn down.
pub trait PreviewSandbox: Send + Sync {
	/// Instantiates a fresh context for `document`.
	fn mount(&mut self, document: &PreviewDocument);

	/// Destroys the current context and all of its execution state.
	fn teardown(&mut self);
}

#[derive(Debug, Default)]
struct HeadlessState {
	current: Option<PreviewDocument>,
	mounts: u64,
	teardowns: u64,
}

/// Sandbox that executes nothing and records what it was asked to show.
///
/// Clones share state, so a caller can keep one handle for inspection and
/// give another to the renderer.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSandbox {
	state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSandbox {
	pub fn new() -> Self {
		Self::default()
	}

	/// Content of the mounted context, if any.
	pub fn mounted_content(&self) -> Option<String> {
		self.state.lock().current.as_ref().map(|doc| doc.content.clone())
	}

	pub fn mounted_key(&self) -> Option<PreviewKey> {
		self.state.lock().current.as_ref().map(|doc| doc.key)
	}

	pub fn mount_count(&self) -> u64 {
		self.state.lock().mounts
	}

	pub fn teardown_count(&self) -> u64 {
		self.state.lock().teardowns
	}
}

impl PreviewSandbox for HeadlessSandbox {
	fn mount(&mut self, document: &PreviewDocument) {
		let mut state = self.state.lock();
		state.current = Some(document.clone());
		state.mounts += 1;
	}

	fn teardown(&mut self) {
		let mut state = self.state.lock();
		state.current = None;
		state.teardowns += 1;
	}
}
