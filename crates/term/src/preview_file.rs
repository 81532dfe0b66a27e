//! Preview sandbox backed by a host page on disk.
//!
//! Each mount rewrites the page, so a browser reload shows a fresh sandboxed
//! frame with none of the previous frame's script state.

use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use vellum_editor::{PreviewDocument, PreviewSandbox};

#[derive(Debug)]
pub struct FilePreviewSandbox {
	path: PathBuf,
	mounted: bool,
}

impl FilePreviewSandbox {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			mounted: false,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl PreviewSandbox for FilePreviewSandbox {
	fn mount(&mut self, document: &PreviewDocument) {
		match std::fs::write(&self.path, document.host_html()) {
			Ok(()) => {
				self.mounted = true;
				trace!(path = %self.path.display(), bytes = document.content.len(), "preview_file.mount");
			}
			Err(error) => {
				warn!(path = %self.path.display(), %error, "preview_file.write_failed");
			}
		}
	}

	fn teardown(&mut self) {
		if !self.mounted {
			return;
		}
		self.mounted = false;
		if let Err(error) = std::fs::write(&self.path, "") {
			warn!(path = %self.path.display(), %error, "preview_file.write_failed");
		}
	}
}
