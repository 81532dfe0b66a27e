//! Single-task event loop driving a [`BufferController`].
//!
//! [`EditorSession`] owns the controller and serializes everything that
//! touches it: commands from any number of [`SessionHandle`]s and timer
//! firings from the debounce channels. The loop is biased toward timer
//! firings, so a channel that elapsed before a later command is applied
//! before that command.
//!
//! After every step the session publishes a [`SessionStatus`] through a
//! `watch` channel for the surrounding UI.


use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;
use vellum_primitives::{Artifact, ArtifactId, SyncStatus};

use crate::controller::BufferController;
use crate::error::SessionError;

/// Commands accepted by the session loop.
#[derive(Debug)]
pub enum SessionCommand {
	Load(Artifact),
	Edit(String),
	Undo,
	Redo,
	ManualSave {
		reply: oneshot::Sender<Option<DateTime<Utc>>>,
	},
	Export {
		reply: oneshot::Sender<Option<Artifact>>,
	},
	Reset,
	Shutdown,
}

/// Observable engine state for indicators and menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
	pub artifact: Option<ArtifactId>,
	pub sync: SyncStatus,
	pub history_index: usize,
	pub history_len: usize,
	pub can_undo: bool,
	pub can_redo: bool,
	pub last_saved_at: Option<DateTime<Utc>>,
}

impl SessionStatus {
	fn capture(controller: &BufferController) -> Self {
		Self {
			artifact: controller.artifact_id(),
			sync: controller.sync_status(),
			history_index: controller.history_index(),
			history_len: controller.history_len(),
			can_undo: controller.can_undo(),
			can_redo: controller.can_redo(),
			last_saved_at: controller.last_saved_at(),
		}
	}
}

/// Cloneable sender side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	commands: mpsc::UnboundedSender<SessionCommand>,
	status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
	fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
		self.commands.send(command).map_err(|_| SessionError::Closed)
	}

	pub fn load(&self, artifact: Artifact) -> Result<(), SessionError> {
		self.send(SessionCommand::Load(artifact))
	}

	pub fn edit(&self, text: impl Into<String>) -> Result<(), SessionError> {
		self.send(SessionCommand::Edit(text.into()))
	}

	pub fn undo(&self) -> Result<(), SessionError> {
		self.send(SessionCommand::Undo)
	}

	pub fn redo(&self) -> Result<(), SessionError> {
		self.send(SessionCommand::Redo)
	}

	pub fn reset(&self) -> Result<(), SessionError> {
		self.send(SessionCommand::Reset)
	}

	/// Asks the loop to exit after draining earlier commands.
	pub fn shutdown(&self) -> Result<(), SessionError> {
		self.send(SessionCommand::Shutdown)
	}

	/// Saves immediately and returns the save moment, if the store was called.
	pub async fn manual_save(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
		let (reply, rx) = oneshot::channel();
		self.send(SessionCommand::ManualSave { reply })?;
		rx.await.map_err(|_| SessionError::Closed)
	}

	/// Returns the loaded artifact carrying the live buffer.
	pub async fn export(&self) -> Result<Option<Artifact>, SessionError> {
		let (reply, rx) = oneshot::channel();
		self.send(SessionCommand::Export { reply })?;
		rx.await.map_err(|_| SessionError::Closed)
	}

	/// Subscribes to status updates.
	pub fn status(&self) -> watch::Receiver<SessionStatus> {
		self.status.clone()
	}

	/// Returns the most recently published status.
	pub fn current_status(&self) -> SessionStatus {
		self.status.borrow().clone()
	}
}

/// Event loop owning a [`BufferController`].
#[derive(Debug)]
pub struct EditorSession {
	controller: BufferController,
	commands: mpsc::UnboundedReceiver<SessionCommand>,
	status: watch::Sender<SessionStatus>,
}

impl EditorSession {
	pub fn new(controller: BufferController) -> (Self, SessionHandle) {
		let (commands_tx, commands) = mpsc::unbounded_channel();
		let (status, status_rx) = watch::channel(SessionStatus::capture(&controller));
		let session = Self {
			controller,
			commands,
			status,
		};
		let handle = SessionHandle {
			commands: commands_tx,
			status: status_rx,
		};
		(session, handle)
	}

	/// Runs until [`SessionCommand::Shutdown`] or every handle is dropped.
	///
	/// Store writes already emitted have completed when this returns. Returns
	/// the controller so callers can inspect final state.
	pub async fn run(mut self) -> BufferController {
		loop {
			tokio::select! {
				biased;

				fired = self.controller.next_timer() => {
					self.controller.on_timer(fired);
				}
				command = self.commands.recv() => {
					let Some(command) = command else {
						debug!("session.handles_dropped");
						break;
					};
					if !self.handle(command) {
						break;
					}
				}
			}
			self.publish();
		}

		self.controller.flush_persistence().await;
		self.controller.metrics().log_summary();
		debug!("session.exit");
		self.controller
	}

	/// Applies one command. Returns `false` on shutdown.
	fn handle(&mut self, command: SessionCommand) -> bool {
		match command {
			SessionCommand::Load(artifact) => self.controller.load(artifact),
			SessionCommand::Edit(text) => {
				self.controller.edit(text);
			}
			SessionCommand::Undo => {
				self.controller.undo();
			}
			SessionCommand::Redo => {
				self.controller.redo();
			}
			SessionCommand::ManualSave { reply } => {
				let _ = reply.send(self.controller.manual_save());
			}
			SessionCommand::Export { reply } => {
				let _ = reply.send(self.controller.export_buffer());
			}
			SessionCommand::Reset => self.controller.reset(),
			SessionCommand::Shutdown => return false,
		}
		true
	}

	fn publish(&self) {
		let next = SessionStatus::capture(&self.controller);
		self.status.send_if_modified(|current| {
			if *current == next {
				false
			} else {
				*current = next;
				true
			}
		});
	}
}
