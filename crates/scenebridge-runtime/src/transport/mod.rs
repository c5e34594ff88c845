//! Transport adapter.
//!
//! The concrete channel (in-process, socket, stdio) implements
//! [`Transport`]. [`TransportAdapter`] wraps it with start/stop/ready
//! state and moves batches from the outbound queue to the wire:
//!
//! ```text
//!            start()         mark_ready() / is_ready()
//! Stopped ───────────► Starting ──────────────────────► Ready
//!    ▲                                                    │
//!    └──────────────────────── stop() ◄───────────────────┘
//! ```
//!
//! While not ready, [`TransportAdapter::flush`] sends nothing and events
//! stay queued. A failed send puts the batch back at the front of the
//! queue, so nothing is lost or reordered.

mod channel;

pub use channel::ChannelTransport;

use crate::queue::EventQueue;
use crate::TransportError;
use scenebridge_event::BatchCodec;
use tracing::{debug, info, warn};

/// A channel that carries encoded batches to the remote side.
pub trait Transport: Send {
    /// Sends one opaque batch.
    ///
    /// # Errors
    ///
    /// [`TransportError::Send`] for a retryable failure,
    /// [`TransportError::Closed`] when the peer is gone.
    fn send_encoded_batch(&mut self, batch: &str) -> Result<(), TransportError>;

    /// Whether the channel can carry batches yet.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Adapter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Starting,
    Ready,
}

/// Start/stop/ready wrapper around a [`Transport`].
pub struct TransportAdapter<T: Transport> {
    transport: T,
    codec: Box<dyn BatchCodec>,
    state: TransportState,
    max_event_count: usize,
}

impl<T: Transport> TransportAdapter<T> {
    /// Creates a stopped adapter that sends at most `max_event_count`
    /// events per batch.
    pub fn new(transport: T, codec: Box<dyn BatchCodec>, max_event_count: usize) -> Self {
        Self {
            transport,
            codec,
            state: TransportState::Stopped,
            max_event_count: max_event_count.max(1),
        }
    }

    #[must_use]
    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Starts the adapter. It becomes ready once the transport reports
    /// readiness or [`mark_ready`](Self::mark_ready) is called.
    pub fn start(&mut self) {
        if self.state == TransportState::Stopped {
            self.state = TransportState::Starting;
            debug!("transport starting");
        }
        self.poll_ready();
    }

    /// Marks a started adapter ready regardless of the transport.
    pub fn mark_ready(&mut self) {
        if self.state == TransportState::Starting {
            self.state = TransportState::Ready;
            info!("transport ready");
        }
    }

    pub fn stop(&mut self) {
        if self.state != TransportState::Stopped {
            self.state = TransportState::Stopped;
            info!("transport stopped");
        }
    }

    /// Returns `true` once started and ready.
    pub fn is_ready(&mut self) -> bool {
        self.poll_ready();
        self.state == TransportState::Ready
    }

    fn poll_ready(&mut self) {
        if self.state == TransportState::Starting && self.transport.is_ready() {
            self.state = TransportState::Ready;
            info!("transport ready");
        }
    }

    /// Sends one batch of up to `max_event_count` events from `queue`.
    ///
    /// Returns the number of events sent; `Ok(0)` when not ready or the
    /// queue is empty.
    ///
    /// # Errors
    ///
    /// The transport's error. The batch is requeued at the front first.
    pub fn flush(&mut self, queue: &EventQueue) -> Result<usize, TransportError> {
        if !self.is_ready() {
            return Ok(0);
        }
        let events = queue.drain(self.max_event_count);
        if events.is_empty() {
            return Ok(0);
        }
        let batch = self.codec.join(&events);
        match self.transport.send_encoded_batch(&batch) {
            Ok(()) => Ok(events.len()),
            Err(err) => {
                warn!(events = events.len(), error = %err, "send failed, batch requeued");
                queue.requeue_front(events);
                Err(err)
            }
        }
    }

    /// Flushes until the queue is empty or a send fails.
    ///
    /// # Errors
    ///
    /// As [`flush`](Self::flush).
    pub fn flush_all(&mut self, queue: &EventQueue) -> Result<usize, TransportError> {
        let mut total = 0;
        loop {
            let sent = self.flush(queue)?;
            if sent == 0 {
                return Ok(total);
            }
            total += sent;
        }
    }
}
