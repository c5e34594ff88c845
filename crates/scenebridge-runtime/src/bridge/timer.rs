//! Delayed-destroy timers.
//!
//! The only timer in the bridge. Driven by [`Bridge::tick`](crate::Bridge::tick);
//! an explicit destroy cancels it, and re-arming replaces the deadline.

use scenebridge_types::ObjectId;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct DestroyTimers {
    remaining: BTreeMap<ObjectId, Duration>,
}

impl DestroyTimers {
    /// Arms (or re-arms) the timer for `id`.
    pub(crate) fn arm(&mut self, id: ObjectId, delay: Duration) {
        self.remaining.insert(id, delay);
    }

    pub(crate) fn cancel(&mut self, id: &ObjectId) -> bool {
        self.remaining.remove(id).is_some()
    }

    pub(crate) fn is_armed(&self, id: &ObjectId) -> bool {
        self.remaining.contains_key(id)
    }

    /// Advances every timer by `dt` and returns the expired ids in id order.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<ObjectId> {
        let mut expired = Vec::new();
        for (id, left) in &mut self.remaining {
            *left = left.saturating_sub(dt);
            if left.is_zero() {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            self.remaining.remove(id);
        }
        expired
    }
}
