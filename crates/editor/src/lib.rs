#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Live artifact editing engine.
//!
//! This crate keeps a text artifact's live buffer, a bounded snapshot
//! history, a sandboxed preview of the debounce-settled content, and a
//! fire-and-forget persistence path in agreement with each other.
//!
//! # Main Types
//!
//! - [`BufferController`] - Owns the buffer and coordinates every other part
//! - [`EditorSession`] - Event loop serializing commands and timer firings
//! - [`SnapshotHistory`] - Bounded undo/redo ring of committed snapshots
//! - [`DebounceScheduler`] - Preview-sync and snapshot-capture channels
//! - [`PreviewRenderer`] - Keyed remount of the sandboxed preview
//! - [`PersistenceBridge`] - Hands revised artifacts to an [`ArtifactStore`]
//!
//! # Architecture
//!
//! ```text
//! SessionHandle ──commands──► EditorSession
//!                                 │
//!                           BufferController
//!          ┌──────────┬───────────┼────────────┬──────────────┐
//!   SnapshotHistory  ProvenanceGate  DebounceScheduler  PreviewRenderer
//!                                                       PersistenceBridge
//! ```

/// Engine configuration and TOML loading.
pub mod config;
pub mod controller;
/// Cancel-and-reschedule timers.
pub mod debounce;
pub mod error;
/// Snapshot history for undo/redo.
pub mod history;
/// Runtime counters for observability.
pub mod metrics;
/// Store seam and bundled stores.
pub mod persistence;
/// Sandboxed preview rendering.
pub mod preview;
pub mod provenance;
pub mod session;

pub use config::EngineConfig;
pub use controller::BufferController;
pub use debounce::{Channel, DebounceScheduler, Ticket, TimerFired};
pub use error::{ConfigError, PersistError, SessionError};
pub use history::SnapshotHistory;
pub use metrics::EngineMetrics;
pub use persistence::{ArtifactStore, FileStore, MemoryStore, PersistenceBridge};
pub use preview::{HeadlessSandbox, PreviewDocument, PreviewKey, PreviewRenderer, PreviewSandbox, RenderOutcome, SandboxPolicy};
pub use provenance::ProvenanceGate;
pub use session::{EditorSession, SessionCommand, SessionHandle, SessionStatus};
