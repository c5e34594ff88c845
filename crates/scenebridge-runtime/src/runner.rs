//! Async bridge runner.
//!
//! [`BridgeRunner`] owns the [`Bridge`] on one tokio task and drives it:
//!
//! ```text
//! RunnerHandle::send_batch ──mpsc──┐
//! RunnerHandle::shutdown ──watch──┐│
//!                                 ▼▼
//!                   select! { biased; shutdown, inbound, tick }
//!                                 │
//!          dispatch_inbound / tick(dt) ──► TransportAdapter::flush_all
//! ```
//!
//! The loop ends on a shutdown signal, when every inbound sender is
//! dropped, or when the transport closes. Batches still buffered in the
//! inbound channel are dispatched and the outbound queue flushed once more
//! before [`BridgeRunner::run`] returns the bridge.

use crate::transport::{Transport, TransportAdapter};
use crate::{Bridge, TransportError};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Inbound batches buffered between the transport and the runner.
const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// Control side of a running [`BridgeRunner`].
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    inbound: mpsc::Sender<String>,
    shutdown: watch::Sender<bool>,
}

impl RunnerHandle {
    /// Delivers one encoded inbound batch.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] once the runner has stopped.
    pub async fn send_batch(&self, batch: impl Into<String>) -> Result<(), TransportError> {
        self.inbound
            .send(batch.into())
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Asks the runner to stop after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Drives a [`Bridge`] and a transport on one task.
pub struct BridgeRunner<T: Transport> {
    bridge: Bridge,
    adapter: TransportAdapter<T>,
    inbound_rx: mpsc::Receiver<String>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<T: Transport> BridgeRunner<T> {
    /// Creates a runner and its handle.
    ///
    /// Batch size and codec come from the bridge's configuration.
    #[must_use]
    pub fn new(bridge: Bridge, transport: T) -> (Self, RunnerHandle) {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = bridge.config();
        let adapter = TransportAdapter::new(
            transport,
            config.transport.codec.build(),
            config.queue.max_event_count,
        );
        let runner = Self {
            bridge,
            adapter,
            inbound_rx,
            shutdown_rx,
        };
        let handle = RunnerHandle {
            inbound: inbound_tx,
            shutdown: shutdown_tx,
        };
        (runner, handle)
    }

    /// Runs until shutdown and returns the bridge.
    pub async fn run(mut self) -> Bridge {
        let period = self.bridge.config().pump.interval();
        info!(tick_ms = period.as_millis() as u64, "bridge runner started");
        self.adapter.start();

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                // Priority: shutdown, then inbound, then the tick.
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("bridge runner: shutdown requested");
                        break;
                    }
                }

                batch = self.inbound_rx.recv() => {
                    match batch {
                        Some(batch) => {
                            self.bridge.receive_inbound_batch(batch);
                            let handled = self.bridge.dispatch_inbound();
                            debug!(handled, "inbound batch dispatched");
                        }
                        None => {
                            info!("bridge runner: inbound channel closed");
                            break;
                        }
                    }
                }

                now = ticker.tick() => {
                    self.bridge.tick(now - last_tick);
                    last_tick = now;
                }
            }

            if !self.flush() {
                break;
            }
        }

        self.inbound_rx.close();
        let mut drained = 0usize;
        while let Ok(batch) = self.inbound_rx.try_recv() {
            self.bridge.receive_inbound_batch(batch);
            drained += 1;
        }
        let handled = self.bridge.dispatch_inbound();
        debug!(drained, handled, "bridge runner: final dispatch");
        self.flush();
        self.adapter.stop();
        info!("bridge runner stopped");
        self.bridge
    }

    /// Sends everything queued. Returns `false` when the transport closed.
    fn flush(&mut self) -> bool {
        let outbound = self.bridge.outbound_queue();
        match self.adapter.flush_all(&outbound) {
            Ok(_) => true,
            Err(TransportError::Closed) => {
                warn!(pending = outbound.len(), "bridge runner: transport closed");
                false
            }
            Err(err) => {
                warn!(error = %err, "bridge runner: send failed, retrying next iteration");
                true
            }
        }
    }
}
