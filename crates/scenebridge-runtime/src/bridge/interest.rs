//! Interest & Query Engine.
//!
//! [`Bridge::emit`] runs one event through the emitting object's interest
//! spec for that event name. The steps always run in this order:
//!
//! | # | Step | Notes |
//! |---|------|-------|
//! | 1 | look up the spec | none → not found |
//! | 2 | `disabled` | counts as not found, side effects still run |
//! | 3 | `update` | property writes on the source |
//! | 4 | `events` | synthetic inbound events, depth limited |
//! | 5 | `doNotSend` | |
//! | 6 | `query` | skipped when `doNotSend`; merged into `data` |
//! | 7 | gate | `(found && !disabled && !doNotSend) \|\| Created \|\| Destroyed` |
//! | 8 | enqueue | `{event, id: source, data}` |
//!
//! An object that is tearing down only runs the query step, and only for
//! `Destroyed`.

use super::path_cache::join_path;
use super::{report, Bridge};
use crate::registry::LifecycleState;
use scenebridge_event::{is_unconditional_event, WireEvent};
use scenebridge_types::ObjectId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

impl Bridge {
    /// Emits `event_name` from `source` through its interests.
    ///
    /// Returns `true` when the event was queued for the wire. Never fails;
    /// problems in side effects are logged.
    pub fn emit(&mut self, source: &ObjectId, event_name: &str, data: Option<Value>) -> bool {
        let Some(object) = self.registry.get(source) else {
            debug!(object = %source, event = event_name, "emit ignored: unknown object");
            return false;
        };
        let teardown = match object.lifecycle() {
            LifecycleState::Active => false,
            LifecycleState::Destroying if event_name == "Destroyed" => true,
            state => {
                debug!(object = %source, event = event_name, %state, "emit ignored: object not active");
                return false;
            }
        };

        let spec = object.interests().and_then(|i| i.get(event_name)).cloned();
        let found = spec.as_ref().is_some_and(|s| !s.disabled);
        let do_not_send = spec.as_ref().is_some_and(|s| s.do_not_send);
        let mut data = data;

        if let Some(spec) = &spec {
            if !teardown {
                if let Some(update) = &spec.update {
                    self.apply_update_bundle(source, "", update, event_name);
                }
                if let Some(events) = &spec.events {
                    self.dispatch_interest_events(source, event_name, events);
                }
                if !self.registry.is_active(source) {
                    debug!(object = %source, event = event_name, "source destroyed by interest events");
                    return false;
                }
            }
            if !do_not_send {
                if let Some(query) = &spec.query {
                    let results = self.evaluate_query(source, "", query, event_name);
                    data = Some(merge_query(data, results));
                }
            }
        }

        let send = (found && !do_not_send) || is_unconditional_event(event_name);
        if !send {
            trace!(object = %source, event = event_name, found, do_not_send, "emit filtered");
            return false;
        }

        let mut event = WireEvent::new(event_name, source.clone());
        if let Some(data) = data {
            event = event.with_data(data);
        }
        self.enqueue_outbound(&event);
        true
    }

    /// Evaluates every path of a query mapping, `null` on failure.
    pub(crate) fn evaluate_query(
        &mut self,
        id: &ObjectId,
        subject: &str,
        query: &BTreeMap<String, String>,
        event: &str,
    ) -> Map<String, Value> {
        query
            .iter()
            .map(|(key, path)| {
                let full = join_path(subject, path);
                let value = match self.read_path(id, &full) {
                    Ok(value) => value.unwrap_or(Value::Null),
                    Err(err) => {
                        report(&err, event, id, Some(&full));
                        Value::Null
                    }
                };
                (key.clone(), value)
            })
            .collect()
    }

    fn dispatch_interest_events(&mut self, source: &ObjectId, event_name: &str, events: &[Value]) {
        let limit = self.config.interests.max_event_depth;
        if self.event_depth >= limit {
            warn!(
                object = %source,
                event = event_name,
                max_event_depth = limit,
                "interest events skipped: depth limit reached"
            );
            return;
        }
        self.event_depth += 1;
        for event in events {
            self.dispatch_synthetic(source, event.clone());
        }
        self.event_depth -= 1;
    }
}

/// Merges query results into event data. Non-object data is kept under
/// `"value"`.
fn merge_query(data: Option<Value>, results: Map<String, Value>) -> Value {
    let mut merged = match data {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    merged.extend(results);
    Value::Object(merged)
}
