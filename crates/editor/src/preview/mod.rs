//! Sandboxed preview of stabilized content.
//!
//! The [`PreviewRenderer`] only ever sees stabilized content. It derives a
//! [`PreviewKey`] from that content and keeps the mounted sandbox context for
//! as long as the key is unchanged. Any change tears the context down and
//! mounts a fresh one, so scripts run once per stabilized version and no
//! execution state carries over between versions.
//!
//! # Render boundary
//!
//! Content is embedded in a host document as the `srcdoc` of an `<iframe>`
//! whose `sandbox` attribute is built from a [`SandboxPolicy`]. The policy
//! can grant scripts, forms, popups, and modal dialogs; there is no way to
//! grant same-origin access, so previewed content can never reach host
//! application state.

mod sandbox;
#[cfg(test)]
mod tests;

use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHasher;
pub use sandbox::{HeadlessSandbox, PreviewSandbox};
use tracing::{debug, trace};

use crate::metrics::EngineMetrics;

bitflags! {
	/// Capabilities granted to previewed content.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SandboxPolicy: u8 {
		/// Run embedded scripts.
		const SCRIPTS = 1 << 0;
		/// Submit forms.
		const FORMS = 1 << 1;
		/// Open popups and new windows.
		const POPUPS = 1 << 2;
		/// Show `alert`, `confirm`, and `prompt` dialogs.
		const MODALS = 1 << 3;
	}
}

impl SandboxPolicy {
	/// Policy for generated artifacts: everything the policy can express.
	pub const PREVIEW: Self = Self::all();

	/// Space-separated `sandbox` attribute tokens.
	pub fn attribute(self) -> String {
		const TOKENS: [(SandboxPolicy, &str); 4] = [
			(SandboxPolicy::SCRIPTS, "allow-scripts"),
			(SandboxPolicy::FORMS, "allow-forms"),
			(SandboxPolicy::POPUPS, "allow-popups"),
			(SandboxPolicy::MODALS, "allow-modals"),
		];
		TOKENS
			.iter()
			.filter(|(flag, _)| self.contains(*flag))
			.map(|(_, token)| *token)
			.collect::<Vec<_>>()
			.join(" ")
	}
}

impl Default for SandboxPolicy {
	fn default() -> Self {
		Self::PREVIEW
	}
}

/// Identity of a stabilized content version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewKey {
	len: usize,
	hash: u64,
}

impl PreviewKey {
	pub fn of(content: &str) -> Self {
		let mut hasher = FxHasher::default();
		content.hash(&mut hasher);
		Self {
			len: content.len(),
			hash: hasher.finish(),
		}
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
}

/// A document ready to be mounted into a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
	pub key: PreviewKey,
	pub policy: SandboxPolicy,
	pub content: String,
}

impl PreviewDocument {
	pub fn new(content: impl Into<String>, policy: SandboxPolicy) -> Self {
		let content = content.into();
		Self {
			key: PreviewKey::of(&content),
			policy,
			content,
		}
	}

	/// Host page embedding the content in a sandboxed frame.
	pub fn host_html(&self) -> String {
		let mut html = String::with_capacity(self.content.len() + 320);
		html.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
		html.push_str(
			"<style>html,body{margin:0;height:100%}iframe{border:0;width:100%;height:100%}</style>\n",
		);
		html.push_str("</head>\n<body>\n");
		let _ = write!(
			html,
			"<iframe title=\"preview\" sandbox=\"{}\" srcdoc=\"",
			self.policy.attribute()
		);
		escape_attribute(&self.content, &mut html);
		html.push_str("\"></iframe>\n</body>\n</html>\n");
		html
	}
}

/// Escapes `value` for use inside a double-quoted HTML attribute.
pub fn escape_attribute(value: &str, out: &mut String) {
	for ch in value.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			_ => out.push(ch),
		}
	}
}

/// Result of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
	/// A fresh sandbox context was mounted.
	Mounted,
	/// The mounted context already shows this content.
	Unchanged,
}

/// Keeps one sandbox context in step with stabilized content.
pub struct PreviewRenderer {
	sandbox: Box<dyn PreviewSandbox>,
	policy: SandboxPolicy,
	mounted: Option<PreviewKey>,
	metrics: Arc<EngineMetrics>,
}

impl std::fmt::Debug for PreviewRenderer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PreviewRenderer")
			.field("policy", &self.policy)
			.field("mounted", &self.mounted)
			.finish_non_exhaustive()
	}
}

impl PreviewRenderer {
	pub fn new(sandbox: Box<dyn PreviewSandbox>, metrics: Arc<EngineMetrics>) -> Self {
		Self::with_policy(sandbox, SandboxPolicy::PREVIEW, metrics)
	}

	pub fn with_policy(
		sandbox: Box<dyn PreviewSandbox>,
		policy: SandboxPolicy,
		metrics: Arc<EngineMetrics>,
	) -> Self {
		Self {
			sandbox,
			policy,
			mounted: None,
			metrics,
		}
	}

	pub fn policy(&self) -> SandboxPolicy {
		self.policy
	}

	pub fn mounted_key(&self) -> Option<PreviewKey> {
		self.mounted
	}

	/// Shows `stabilized`, remounting only if its key differs from the mounted one.
	pub fn render(&mut self, stabilized: &str) -> RenderOutcome {
		let key = PreviewKey::of(stabilized);
		if self.mounted == Some(key) {
			trace!(len = key.len(), "preview.unchanged");
			return RenderOutcome::Unchanged;
		}

		if self.mounted.take().is_some() {
			self.sandbox.teardown();
		}
		let document = PreviewDocument {
			key,
			policy: self.policy,
			content: stabilized.to_owned(),
		};
		self.sandbox.mount(&document);
		self.mounted = Some(key);
		self.metrics.inc_preview_mount();
		debug!(len = key.len(), hash = key.hash, "preview.mount");
		RenderOutcome::Mounted
	}

	/// Tears down the mounted context, if any.
	pub fn clear(&mut self) {
		if self.mounted.take().is_some() {
			self.sandbox.teardown();
			debug!("preview.clear");
		}
	}
}
