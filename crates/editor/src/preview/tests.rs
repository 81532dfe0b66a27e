use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;

fn renderer() -> (PreviewRenderer, HeadlessSandbox, Arc<EngineMetrics>) {
	let sandbox = HeadlessSandbox::new();
	let metrics = Arc::new(EngineMetrics::new());
	let renderer = PreviewRenderer::new(Box::new(sandbox.clone()), metrics.clone());
	(renderer, sandbox, metrics)
}

#[test]
fn identical_content_keeps_context() {
	let (mut renderer, sandbox, metrics) = renderer();

	assert_eq!(renderer.render("<p>a</p>"), RenderOutcome::Mounted);
	assert_eq!(renderer.render("<p>a</p>"), RenderOutcome::Unchanged);

	assert_eq!(sandbox.mount_count(), 1);
	assert_eq!(sandbox.teardown_count(), 0);
	assert_eq!(metrics.preview_mount_count(), 1);
}

#[test]
fn changed_content_remounts_fresh_context() {
	let (mut renderer, sandbox, _) = renderer();

	renderer.render("<script>let n = 1</script>");
	assert_eq!(renderer.render("<script>let n = 2</script>"), RenderOutcome::Mounted);

	assert_eq!(sandbox.mount_count(), 2);
	assert_eq!(sandbox.teardown_count(), 1);
	assert_eq!(sandbox.mounted_content().as_deref(), Some("<script>let n = 2</script>"));
	assert_eq!(renderer.mounted_key(), sandbox.mounted_key());
}

#[test]
fn same_length_edit_still_remounts() {
	let (mut renderer, sandbox, _) = renderer();

	renderer.render("abc");
	assert_eq!(renderer.render("abd"), RenderOutcome::Mounted);
	assert_eq!(sandbox.mount_count(), 2);
}

#[test]
fn clear_tears_down_once() {
	let (mut renderer, sandbox, _) = renderer();

	renderer.render("x");
	renderer.clear();
	renderer.clear();

	assert_eq!(sandbox.teardown_count(), 1);
	assert_eq!(sandbox.mounted_content(), None);
	assert_eq!(renderer.render("x"), RenderOutcome::Mounted);
}

#[test]
fn preview_policy_never_grants_same_origin() {
	let attribute = SandboxPolicy::PREVIEW.attribute();
	assert_eq!(attribute, "allow-scripts allow-forms allow-popups allow-modals");
	assert!(!attribute.contains("same-origin"));

	assert_eq!(SandboxPolicy::SCRIPTS.attribute(), "allow-scripts");
	assert_eq!(SandboxPolicy::empty().attribute(), "");
}

#[test]
fn host_html_escapes_content_into_srcdoc() {
	let document = PreviewDocument::new("<a href=\"x\">Q&A</a>", SandboxPolicy::SCRIPTS | SandboxPolicy::MODALS);
	let html = document.host_html();

	assert!(html.contains("sandbox=\"allow-scripts allow-modals\""));
	assert!(html.contains("srcdoc=\"&lt;a href=&quot;x&quot;&gt;Q&amp;A&lt;/a&gt;\""));
	assert!(!html.contains("<a href"));
}

#[test]
fn key_tracks_content() {
	assert_eq!(PreviewKey::of("abc"), PreviewKey::of("abc"));
	assert_ne!(PreviewKey::of("abc"), PreviewKey::of("abd"));
	assert!(PreviewKey::of("").is_empty());
	assert_eq!(PreviewKey::of("abc").len(), 3);
}
