use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
	/// Generates a new random artifact ID.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}
}

impl fmt::Display for ArtifactId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Opaque handle to the resource an artifact was generated from.
///
/// The engine never dereferences it; it is carried through persistence so the
/// store can keep the association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(String);

impl ResourceHandle {
	pub fn new(handle: impl Into<String>) -> Self {
		Self(handle.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A generated document: markup, styles, and scripts in a single source.
///
/// The external store owns the durable record. Editors hold a working copy
/// whose `content` is the last content handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	pub id: ArtifactId,
	pub name: String,
	pub content: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub original_reference: Option<ResourceHandle>,
	pub last_modified: DateTime<Utc>,
}

impl Artifact {
	/// Creates an artifact with a fresh ID, stamped now.
	pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			id: ArtifactId::generate(),
			name: name.into(),
			content: content.into(),
			original_reference: None,
			last_modified: Utc::now(),
		}
	}

	pub fn with_reference(mut self, reference: ResourceHandle) -> Self {
		self.original_reference = Some(reference);
		self
	}

	/// Returns a clone carrying `content` and the `at` timestamp.
	///
	/// Identity, name, and the original reference are preserved so stores can
	/// replace their record for the same ID.
	pub fn revised(&self, content: impl Into<String>, at: DateTime<Utc>) -> Self {
		Self {
			id: self.id,
			name: self.name.clone(),
			content: content.into(),
			original_reference: self.original_reference.clone(),
			last_modified: at,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn revised_keeps_identity() {
		let artifact =
			Artifact::new("landing page", "<h1>hi</h1>").with_reference(ResourceHandle::new("upload-7"));
		let later = artifact.last_modified + chrono::Duration::seconds(5);

		let revised = artifact.revised("<h1>hello</h1>", later);

		assert_eq!(revised.id, artifact.id);
		assert_eq!(revised.name, "landing page");
		assert_eq!(revised.content, "<h1>hello</h1>");
		assert_eq!(revised.original_reference, artifact.original_reference);
		assert_eq!(revised.last_modified, later);
	}

	#[test]
	fn serializes_camel_case_without_missing_reference() {
		let artifact = Artifact::new("card", "<p></p>");
		let json = serde_json::to_value(&artifact).unwrap();

		assert!(json.get("lastModified").is_some());
		assert!(json.get("originalReference").is_none());
		assert_eq!(json["id"], serde_json::Value::String(artifact.id.to_string()));

		let back: Artifact = serde_json::from_value(json).unwrap();
		assert_eq!(back, artifact);
	}
}
