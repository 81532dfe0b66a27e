#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Core types shared by the editing engine and its frontends.

/// Artifact records and identifiers.
pub mod artifact;
/// Origin tags for buffer mutations.
pub mod provenance;
/// Preview synchronization indicator.
pub mod status;

pub use artifact::{Artifact, ArtifactId, ResourceHandle};
pub use provenance::Provenance;
pub use status::SyncStatus;
