//! Event queues shared between the bridge thread and transport I/O.
//!
//! ```text
//!  transport thread                    bridge thread
//!  ────────────────                    ─────────────
//!  InboundHandle::receive_inbound_batch ──► inbound  ──► dispatch_inbound()
//!                                          (batches)
//!  Transport::send_encoded_batch  ◄── join ◄─ outbound ◄── emit()
//!                                          (single events)
//! ```
//!
//! Both queues are FIFO over `Arc<parking_lot::Mutex<VecDeque<String>>>`.
//! Every push and drain holds the lock for the whole operation, so a
//! reader never observes a half-written batch. Nothing is ever dropped:
//! a bounded drain leaves the remainder for the next one.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// A cloneable FIFO of encoded strings.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<String>>>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry.
    pub fn push(&self, entry: String) {
        let mut queue = self.inner.lock();
        queue.push_back(entry);
        trace!(len = queue.len(), "queue push");
    }

    /// Puts entries back at the front, keeping their relative order.
    ///
    /// Used when a drained batch could not be delivered.
    pub fn requeue_front(&self, entries: Vec<String>) {
        let mut queue = self.inner.lock();
        for entry in entries.into_iter().rev() {
            queue.push_front(entry);
        }
    }

    /// Removes up to `max` entries from the front, in FIFO order.
    pub fn drain(&self, max: usize) -> Vec<String> {
        let mut queue = self.inner.lock();
        let count = max.min(queue.len());
        queue.drain(..count).collect()
    }

    /// Removes everything.
    pub fn drain_all(&self) -> Vec<String> {
        self.inner.lock().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Producer side of a bridge's inbound queue.
///
/// Cheap to clone and `Send`, so a transport I/O thread can hold one.
#[derive(Debug, Clone)]
pub struct InboundHandle {
    queue: EventQueue,
}

impl InboundHandle {
    pub(crate) fn new(queue: EventQueue) -> Self {
        Self { queue }
    }

    /// Queues one encoded batch for the next `dispatch_inbound`.
    pub fn receive_inbound_batch(&self, batch: impl Into<String>) {
        self.queue.push(batch.into());
    }

    /// Batches waiting for dispatch.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> EventQueue {
        let queue = EventQueue::new();
        for i in 0..n {
            queue.push(format!("e{i}"));
        }
        queue
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = EventQueue::new();
        assert!(queue.is_empty());
        assert!(queue.drain(3).is_empty());
    }

    #[test]
    fn bounded_drain_carries_remainder() {
        let queue = filled(7);
        assert_eq!(queue.drain(3), vec!["e0", "e1", "e2"]);
        assert_eq!(queue.drain(3), vec!["e3", "e4", "e5"]);
        assert_eq!(queue.drain(3), vec!["e6"]);
        assert!(queue.drain(3).is_empty());
    }

    #[test]
    fn requeue_front_preserves_order() {
        let queue = filled(4);
        let first = queue.drain(2);
        queue.requeue_front(first);
        assert_eq!(queue.drain_all(), vec!["e0", "e1", "e2", "e3"]);
    }

    #[test]
    fn clones_share_storage() {
        let queue = EventQueue::new();
        let handle = InboundHandle::new(queue.clone());
        handle.receive_inbound_batch("[]");
        assert_eq!(handle.pending(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn pushes_from_another_thread_are_whole() {
        let queue = EventQueue::new();
        let handle = InboundHandle::new(queue.clone());
        let worker = std::thread::spawn(move || {
            for i in 0..100 {
                handle.receive_inbound_batch(format!("[{{\"event\":\"Log\",\"n\":{i}}}]"));
            }
        });
        worker.join().expect("producer thread");
        let batches = queue.drain_all();
        assert_eq!(batches.len(), 100);
        assert!(batches.iter().all(|b| b.starts_with('[') && b.ends_with(']')));
    }
}
