//! Engine timing and capacity configuration.
//!
//! Configuration is read from TOML. Every key is optional:
//!
//! ```toml
//! preview_delay_ms = 800
//! snapshot_delay_ms = 1000
//! history_capacity = 100
//! ```


use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Quiet period before the preview catches up with the buffer.
pub const DEFAULT_PREVIEW_DELAY: Duration = Duration::from_millis(800);

/// Quiet period before a settled edit is committed to history.
pub const DEFAULT_SNAPSHOT_DELAY: Duration = Duration::from_millis(1000);

/// Maximum number of snapshots retained per artifact.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Validated engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
	/// Delay of the preview-sync channel.
	pub preview_delay: Duration,
	/// Delay of the snapshot-capture channel. Never shorter than `preview_delay`.
	pub snapshot_delay: Duration,
	/// Snapshot history capacity.
	pub history_capacity: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			preview_delay: DEFAULT_PREVIEW_DELAY,
			snapshot_delay: DEFAULT_SNAPSHOT_DELAY,
			history_capacity: DEFAULT_HISTORY_CAPACITY,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
	preview_delay_ms: Option<u64>,
	snapshot_delay_ms: Option<u64>,
	history_capacity: Option<usize>,
}

impl EngineConfig {
	/// Reads and validates a TOML configuration file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Parses and validates TOML configuration text.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let raw: RawConfig = toml::from_str(text)?;
		let defaults = Self::default();
		let config = Self {
			preview_delay: raw
				.preview_delay_ms
				.map_or(defaults.preview_delay, Duration::from_millis),
			snapshot_delay: raw
				.snapshot_delay_ms
				.map_or(defaults.snapshot_delay, Duration::from_millis),
			history_capacity: raw.history_capacity.unwrap_or(defaults.history_capacity),
		};
		config.validate()?;
		Ok(config)
	}

	/// Checks range constraints between fields.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.preview_delay.is_zero() {
			return Err(ConfigError::Invalid {
				field: "preview_delay_ms",
				reason: "must be greater than zero".into(),
			});
		}
		if self.snapshot_delay < self.preview_delay {
			return Err(ConfigError::Invalid {
				field: "snapshot_delay_ms",
				reason: format!(
					"must not be shorter than preview_delay_ms ({} ms)",
					self.preview_delay.as_millis()
				),
			});
		}
		if self.history_capacity == 0 {
			return Err(ConfigError::Invalid {
				field: "history_capacity",
				reason: "must hold at least one snapshot".into(),
			});
		}
		Ok(())
	}
}
