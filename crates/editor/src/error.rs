//! Error types for configuration, persistence, and session handles.

use std::path::PathBuf;

use thiserror::Error;
use vellum_primitives::ArtifactId;

/// Errors that can occur when loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is outside its allowed range.
	#[error("invalid value for `{field}`: {reason}")]
	Invalid {
		/// Configuration key that was rejected.
		field: &'static str,
		/// Human-readable constraint that was violated.
		reason: String,
	},
}

/// Errors reported by an [`ArtifactStore`](crate::persistence::ArtifactStore).
///
/// The engine never retries or rolls back on these; they are logged and
/// counted.
#[derive(Debug, Error)]
pub enum PersistError {
	/// Error writing or reading a stored record.
	#[error("I/O error at {path}: {error}")]
	Io {
		/// Path of the record involved.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The record could not be encoded or decoded.
	#[error("failed to encode artifact {id}: {error}")]
	Encode {
		/// Artifact whose record failed.
		id: ArtifactId,
		/// The underlying serialization error.
		error: serde_json::Error,
	},

	/// The store refused the write.
	#[error("store rejected artifact {id}: {reason}")]
	Rejected {
		/// Artifact whose write was refused.
		id: ArtifactId,
		/// Store-supplied reason.
		reason: String,
	},
}

/// Errors returned by [`SessionHandle`](crate::session::SessionHandle).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
	/// The session loop has exited and no longer accepts commands.
	#[error("editor session is closed")]
	Closed,
}
