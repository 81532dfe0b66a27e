//! CLI schema for the vellum binary.

use std::path::{Path, PathBuf};

use clap::Parser;


/// Store directory used when `--store` is omitted.
pub const DEFAULT_STORE_DIR: &str = ".vellum/store";

#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(about = "Live artifact editor with debounced preview and persistence")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Artifact file to load
	pub file: PathBuf,

	/// Engine configuration file (TOML)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Directory receiving persisted artifact records
	#[arg(long, value_name = "DIR")]
	pub store: Option<PathBuf>,

	/// Write the sandboxed preview host page to this path
	#[arg(long, value_name = "PATH")]
	pub preview: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v')]
	pub verbose: bool,
}

impl Cli {
	pub fn store_dir(&self) -> PathBuf {
		self.store
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
	}

	/// Artifact name derived from the file name.
	pub fn artifact_name(&self) -> String {
		artifact_name(&self.file)
	}
}

fn artifact_name(path: &Path) -> String {
	path.file_stem()
		.or_else(|| path.file_name())
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| "untitled".to_string())
}
