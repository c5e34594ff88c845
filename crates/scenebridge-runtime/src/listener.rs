//! Model listeners for the render/view layer.
//!
//! Views never hold object references across ticks. They register a
//! [`ModelListener`] and re-fetch through the bridge when notified.
//!
//! # Example
//!
//! ```
//! use scenebridge_runtime::{LifecycleState, ModelListener};
//! use scenebridge_types::ObjectId;
//! use std::sync::{Arc, Mutex};
//!
//! struct Dirty(Arc<Mutex<Vec<String>>>);
//!
//! impl ModelListener for Dirty {
//!     fn on_model_changed(&mut self, id: &ObjectId, path: &str) {
//!         self.0.lock().unwrap().push(format!("{id}:{path}"));
//!     }
//! }
//! ```

use crate::LifecycleState;
use scenebridge_types::{ListenerId, ObjectId};

/// Receives model-change notifications.
pub trait ModelListener: Send {
    /// A property write, method update or reparent succeeded.
    ///
    /// `path` is the written path relative to the object (`""` for the
    /// object as a whole).
    fn on_model_changed(&mut self, id: &ObjectId, path: &str);

    /// The object entered `state`.
    fn on_lifecycle(&mut self, _id: &ObjectId, _state: LifecycleState) {}
}

/// Registered listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<(ListenerId, Box<dyn ModelListener>)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Box<dyn ModelListener>) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn model_changed(&mut self, id: &ObjectId, path: &str) {
        for (_, listener) in &mut self.entries {
            listener.on_model_changed(id, path);
        }
    }

    pub(crate) fn lifecycle(&mut self, id: &ObjectId, state: LifecycleState) {
        for (_, listener) in &mut self.entries {
            listener.on_lifecycle(id, state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
