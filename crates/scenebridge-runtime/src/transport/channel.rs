//! In-process transport over a tokio channel.

use super::Transport;
use crate::TransportError;
use tokio::sync::mpsc;

/// Sends batches into an unbounded mpsc channel.
///
/// The receiving half is the remote side: a stdout writer, a socket task,
/// or a test.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Creates a transport and the receiver for its batches.
    #[must_use]
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn send_encoded_batch(&mut self, batch: &str) -> Result<(), TransportError> {
        self.tx
            .send(batch.to_string())
            .map_err(|_| TransportError::Closed)
    }

    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }
}
