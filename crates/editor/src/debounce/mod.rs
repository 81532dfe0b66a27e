//! Cancel-and-reschedule timers for the preview and snapshot channels.
//!
//! Each [`Channel`] holds at most one armed timer task. Arming a channel
//! cancels its previous task and spawns a new one that sleeps for the
//! channel's delay, then posts a [`TimerFired`] message. Nothing is mutated
//! from the timer task: the owner of the [`DebounceScheduler`] receives the
//! message and applies the channel on its own task.
//!
//! # Tickets
//!
//! A firing carries the [`Ticket`] it was armed with. The scheduler accepts
//! it only if the ticket is still the channel's armed ticket, which covers
//! two races cancellation alone cannot:
//!
//! - the task posted its message before being cancelled, and
//! - the message belongs to an earlier epoch (a previously loaded artifact).


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::metrics::EngineMetrics;

/// Debounced work driven by buffer mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
	/// Stabilizes the buffer for preview and persistence.
	PreviewSync,
	/// Commits the settled buffer to snapshot history.
	SnapshotCapture,
}

impl Channel {
	pub const ALL: [Channel; 2] = [Channel::PreviewSync, Channel::SnapshotCapture];

	pub const fn name(self) -> &'static str {
		match self {
			Channel::PreviewSync => "preview_sync",
			Channel::SnapshotCapture => "snapshot_capture",
		}
	}
}

/// Identity of one armed timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
	/// Scheduler epoch at arm time; bumped on every artifact load.
	pub epoch: u64,
	/// Per-channel arm counter.
	pub generation: u64,
}

/// Message posted by a timer task whose delay elapsed uninterrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
	pub channel: Channel,
	pub ticket: Ticket,
}

#[derive(Debug)]
struct ArmedTimer {
	ticket: Ticket,
	cancel: CancellationToken,
}

#[derive(Debug)]
struct DebounceChannel {
	channel: Channel,
	delay: Duration,
	generation: u64,
	armed: Option<ArmedTimer>,
}

impl DebounceChannel {
	fn new(channel: Channel, delay: Duration) -> Self {
		Self {
			channel,
			delay,
			generation: 0,
			armed: None,
		}
	}

	fn arm(&mut self, epoch: u64, fired_tx: &mpsc::UnboundedSender<TimerFired>) -> Ticket {
		self.cancel();
		self.generation = self.generation.wrapping_add(1);
		let ticket = Ticket {
			epoch,
			generation: self.generation,
		};

		let cancel = CancellationToken::new();
		self.armed = Some(ArmedTimer {
			ticket,
			cancel: cancel.clone(),
		});

		let channel = self.channel;
		let delay = self.delay;
		let tx = fired_tx.clone();
		tokio::spawn(async move {
			tokio::select! {
				_ = cancel.cancelled() => {}
				_ = sleep(delay) => {
					let _ = tx.send(TimerFired { channel, ticket });
				}
			}
		});

		ticket
	}

	fn cancel(&mut self) -> bool {
		match self.armed.take() {
			Some(armed) => {
				armed.cancel.cancel();
				true
			}
			None => false,
		}
	}

	/// Disarms the channel if `ticket` is the armed ticket.
	fn accept(&mut self, ticket: Ticket) -> bool {
		if self.armed.as_ref().is_some_and(|armed| armed.ticket == ticket) {
			self.armed = None;
			true
		} else {
			false
		}
	}
}

/// Owner of both debounce channels and the firing queue.
///
/// Must be used from within a tokio runtime; arming spawns timer tasks.
#[derive(Debug)]
pub struct DebounceScheduler {
	preview: DebounceChannel,
	snapshot: DebounceChannel,
	epoch: u64,
	fired_tx: mpsc::UnboundedSender<TimerFired>,
	fired_rx: mpsc::UnboundedReceiver<TimerFired>,
	metrics: Arc<EngineMetrics>,
}

impl DebounceScheduler {
	pub fn new(preview_delay: Duration, snapshot_delay: Duration, metrics: Arc<EngineMetrics>) -> Self {
		let (fired_tx, fired_rx) = mpsc::unbounded_channel();
		Self {
			preview: DebounceChannel::new(Channel::PreviewSync, preview_delay),
			snapshot: DebounceChannel::new(Channel::SnapshotCapture, snapshot_delay),
			epoch: 0,
			fired_tx,
			fired_rx,
			metrics,
		}
	}

	fn channel_mut(&mut self, channel: Channel) -> &mut DebounceChannel {
		match channel {
			Channel::PreviewSync => &mut self.preview,
			Channel::SnapshotCapture => &mut self.snapshot,
		}
	}

	fn channel(&self, channel: Channel) -> &DebounceChannel {
		match channel {
			Channel::PreviewSync => &self.preview,
			Channel::SnapshotCapture => &self.snapshot,
		}
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn delay(&self, channel: Channel) -> Duration {
		self.channel(channel).delay
	}

	pub fn is_armed(&self, channel: Channel) -> bool {
		self.channel(channel).armed.is_some()
	}

	pub fn has_armed(&self) -> bool {
		Channel::ALL.iter().any(|&channel| self.is_armed(channel))
	}

	/// Cancels and re-arms one channel.
	pub fn arm(&mut self, channel: Channel) -> Ticket {
		let epoch = self.epoch;
		let tx = self.fired_tx.clone();
		let ticket = self.channel_mut(channel).arm(epoch, &tx);
		trace!(
			channel = channel.name(),
			epoch = ticket.epoch,
			generation = ticket.generation,
			"debounce.arm"
		);
		ticket
	}

	/// Cancels and re-arms both channels.
	pub fn rearm_all(&mut self) {
		for channel in Channel::ALL {
			self.arm(channel);
		}
	}

	/// Cancels every armed timer. Returns the number of timers cancelled.
	pub fn cancel_all(&mut self) -> usize {
		let cancelled = Channel::ALL
			.into_iter()
			.filter(|&channel| self.channel_mut(channel).cancel())
			.count();
		if cancelled > 0 {
			trace!(cancelled, "debounce.cancel_all");
		}
		cancelled
	}

	/// Cancels every armed timer and starts a new epoch.
	///
	/// Firings already queued from the previous epoch are rejected by
	/// [`accept`](Self::accept).
	pub fn begin_epoch(&mut self) -> u64 {
		self.cancel_all();
		self.epoch = self.epoch.wrapping_add(1);
		self.epoch
	}

	/// Validates a firing, disarming its channel if it is current.
	///
	/// Returns the channel to apply, or `None` for a stale firing.
	pub fn accept(&mut self, fired: TimerFired) -> Option<Channel> {
		let current_epoch = self.epoch;
		let accepted =
			fired.ticket.epoch == current_epoch && self.channel_mut(fired.channel).accept(fired.ticket);
		if accepted {
			trace!(
				channel = fired.channel.name(),
				generation = fired.ticket.generation,
				"debounce.fire"
			);
			Some(fired.channel)
		} else {
			self.metrics.inc_stale_firing();
			trace!(
				channel = fired.channel.name(),
				epoch = fired.ticket.epoch,
				current_epoch,
				generation = fired.ticket.generation,
				"debounce.stale"
			);
			None
		}
	}

	/// Waits for the next raw firing. Pends forever while nothing is queued.
	pub async fn recv(&mut self) -> TimerFired {
		match self.fired_rx.recv().await {
			Some(fired) => fired,
			// The scheduler owns a sender, so the queue never closes.
			None => std::future::pending().await,
		}
	}

	/// Pops the next queued firing that is still current, without waiting.
	pub fn try_next(&mut self) -> Option<Channel> {
		while let Ok(fired) = self.fired_rx.try_recv() {
			if let Some(channel) = self.accept(fired) {
				return Some(channel);
			}
		}
		None
	}

	/// Waits for the next current firing.
	///
	/// Returns `None` once no channel is armed.
	pub async fn next(&mut self) -> Option<Channel> {
		loop {
			if let Some(channel) = self.try_next() {
				return Some(channel);
			}
			if !self.has_armed() {
				return None;
			}
			let fired = self.recv().await;
			if let Some(channel) = self.accept(fired) {
				return Some(channel);
			}
		}
	}
}

impl Drop for DebounceScheduler {
	fn drop(&mut self) {
		self.cancel_all();
	}
}
