//! Query callback routing.
//!
//! A callback id names one pending query result. Two kinds exist:
//!
//! | Origin | Delivery |
//! |--------|----------|
//! | registered locally via [`Bridge::register_callback`](crate::Bridge::register_callback) | [`QueryListener::on_result`] |
//! | minted by the remote controller | outbound `Callback` event |
//!
//! Either way a callback id fires at most once. A second firing is a
//! [`BridgeError::DuplicateCallback`], logged by the caller and ignored.

use crate::BridgeError;
use scenebridge_types::{CallbackId, ObjectId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Receives a locally registered query result.
pub trait QueryListener: Send {
    fn on_result(&mut self, callback: &CallbackId, object: &ObjectId, result: &Value);
}

impl<F> QueryListener for F
where
    F: FnMut(&CallbackId, &ObjectId, &Value) + Send,
{
    fn on_result(&mut self, callback: &CallbackId, object: &ObjectId, result: &Value) {
        self(callback, object, result);
    }
}

/// Where a routed result went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to a local [`QueryListener`].
    Local,
    /// Must be sent to the remote controller.
    Remote,
}

/// Pending local callbacks plus the set of ids that already fired.
#[derive(Default)]
pub struct CallbackRouter {
    pending: HashMap<CallbackId, Box<dyn QueryListener>>,
    fired: HashSet<CallbackId>,
}

impl CallbackRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a local listener under a fresh, never reused id.
    pub fn register(&mut self, listener: Box<dyn QueryListener>) -> CallbackId {
        let mut id = CallbackId::generate();
        while self.pending.contains_key(&id) || self.fired.contains(&id) {
            id = CallbackId::generate();
        }
        self.pending.insert(id.clone(), listener);
        id
    }

    /// Number of local callbacks still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` once `id` has been delivered.
    #[must_use]
    pub fn has_fired(&self, id: &CallbackId) -> bool {
        self.fired.contains(id)
    }

    /// Routes one result.
    ///
    /// # Errors
    ///
    /// [`BridgeError::DuplicateCallback`] when `id` already fired.
    pub fn route(&mut self, id: &CallbackId, object: &ObjectId, result: &Value) -> Result<Delivery, BridgeError> {
        if !self.fired.insert(id.clone()) {
            return Err(BridgeError::DuplicateCallback(id.clone()));
        }
        match self.pending.remove(id) {
            Some(mut listener) => {
                listener.on_result(id, object, result);
                Ok(Delivery::Local)
            }
            None => Ok(Delivery::Remote),
        }
    }
}
