//! Inbound dispatch, outbound draining and the tick.
//!
//! ```text
//! receive_inbound_batch ──► inbound queue ──► dispatch_inbound
//!                                                  │ codec.split, per event:
//!                                                  ▼
//!                                          dispatch_event ──► handle_*
//!                                                  │
//!                                          flush_emissions
//! ```
//!
//! Events of one batch run in batch order. A malformed or unknown event
//! is logged and skipped; the rest of the batch still runs.

use super::animation::AnimationStep;
use super::{report, Bridge};
use crate::BridgeError;
use scenebridge_event::{value_kind, EventError, MessageKind, WireEvent};
use scenebridge_object::get_value;
use scenebridge_types::{CallbackId, ObjectId};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, trace};

impl Bridge {
    /// Queues one encoded inbound batch for the next dispatch.
    pub fn receive_inbound_batch(&self, batch: impl Into<String>) {
        self.inbound.push(batch.into());
    }

    /// Dispatches every queued inbound batch.
    ///
    /// Returns the number of events handled without error.
    pub fn dispatch_inbound(&mut self) -> usize {
        let mut handled = 0;
        for batch in self.inbound.drain_all() {
            for item in self.codec.split(&batch) {
                let event = match item.and_then(WireEvent::from_value) {
                    Ok(event) => event,
                    Err(err) => {
                        report(&BridgeError::from(err), "decode", &ObjectId::default(), None);
                        continue;
                    }
                };
                if self.dispatch_logged(event) {
                    handled += 1;
                }
                self.flush_emissions();
            }
        }
        handled
    }

    /// Routes one inbound event by its kind.
    ///
    /// Events addressed to an object that is tearing down are a no-op.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownMessageKind`] for application or outbound-only
    /// kinds, [`BridgeError::InvalidMessage`] for malformed fields, and
    /// whatever the handler returns.
    pub fn dispatch_event(&mut self, event: WireEvent) -> Result<(), BridgeError> {
        let kind = match event.kind() {
            Ok(kind) if kind.is_inbound() => kind,
            _ => return Err(BridgeError::UnknownMessageKind(event.event.clone())),
        };
        trace!(kind = %kind, object = %event.id, path = event.path_str(), "dispatch");

        let id = &event.id;
        let path = event.path_str();
        if !matches!(kind, MessageKind::Create | MessageKind::Log)
            && self.registry.contains(id)
            && !self.registry.is_active(id)
        {
            debug!(kind = %kind, object = %id, "ignored: object is tearing down");
            return Ok(());
        }

        match kind {
            MessageKind::Create => {
                let spec = super::CreateSpec::from_event(&event)?;
                self.handle_create(spec).map(drop)
            }
            MessageKind::Update => {
                let data = event.require_data()?;
                let Value::Object(bundle) = data else {
                    return Err(EventError::invalid_field("data", "object", value_kind(data)).into());
                };
                self.handle_update(id, bundle, path).map(drop)
            }
            MessageKind::Query => {
                let query = parse_query(event.require_data_field("query")?)?;
                let callback = match event.data_field("callbackID") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(CallbackId::new(s.as_str())),
                    Some(other) => {
                        return Err(EventError::invalid_field("data.callbackID", "string", value_kind(other)).into())
                    }
                };
                self.handle_query(id, &query, callback.as_ref(), path).map(drop)
            }
            MessageKind::Destroy => self.handle_destroy(id, path),
            MessageKind::DestroyAfter => {
                let delay = event.require_data_field("delay")?;
                let seconds = delay
                    .as_f64()
                    .ok_or_else(|| EventError::invalid_field("data.delay", "number", value_kind(delay)))?;
                self.handle_destroy_after(id, seconds, path)
            }
            MessageKind::AddComponent => {
                let class = event.require_data_field("className")?;
                let class = class
                    .as_str()
                    .ok_or_else(|| EventError::invalid_field("data.className", "string", value_kind(class)))?;
                self.handle_add_component(id, class, path)
            }
            MessageKind::SetParent => {
                let parent_path = match event.data_field("path") {
                    None | Some(Value::Null) => "",
                    Some(Value::String(s)) => s.as_str(),
                    Some(other) => {
                        return Err(EventError::invalid_field("data.path", "string", value_kind(other)).into())
                    }
                };
                let stays = match event.data_field("worldPositionStays") {
                    None | Some(Value::Null) => true,
                    Some(Value::Bool(b)) => *b,
                    Some(other) => {
                        return Err(EventError::invalid_field("data.worldPositionStays", "bool", value_kind(other)).into())
                    }
                };
                self.handle_set_parent(id, parent_path, stays, path)
            }
            MessageKind::Animate => {
                let steps = AnimationStep::parse_all(event.require_data()?)?;
                self.handle_animate(id, steps, path)
            }
            MessageKind::UpdateInterests => {
                let data = event.require_data()?;
                let Value::Object(updates) = data else {
                    return Err(EventError::invalid_field("data", "object", value_kind(data)).into());
                };
                self.handle_update_interests(id, updates, path)
            }
            MessageKind::Log => {
                let line = event.require_data_field("line")?;
                match line {
                    Value::String(text) => info!(target: "scenebridge::remote", object = %id, "{text}"),
                    other => info!(target: "scenebridge::remote", object = %id, "{other}"),
                }
                Ok(())
            }
            MessageKind::Created | MessageKind::Destroyed | MessageKind::Callback => {
                Err(BridgeError::UnknownMessageKind(event.event.clone()))
            }
        }
    }

    /// Dispatches an interest or create-time synthetic event. A missing
    /// `id` defaults to `source`.
    pub(crate) fn dispatch_synthetic(&mut self, source: &ObjectId, value: Value) {
        let mut event = match WireEvent::from_value(value) {
            Ok(event) => event,
            Err(err) => {
                report(&BridgeError::from(err), "synthetic", source, None);
                return;
            }
        };
        if event.id.is_empty() {
            event.id = source.clone();
        }
        self.dispatch_logged(event);
    }

    fn dispatch_logged(&mut self, event: WireEvent) -> bool {
        let name = event.event.clone();
        let id = event.id.clone();
        let path = event.path.clone();
        match self.dispatch_event(event) {
            Ok(()) => true,
            Err(err) => {
                report(&err, &name, &id, path.as_deref());
                false
            }
        }
    }

    /// Encodes and queues one outbound event.
    pub fn enqueue_outbound(&self, event: &WireEvent) {
        match event.encode() {
            Ok(encoded) => self.outbound.push(encoded),
            Err(err) => error!(event = %event.event, object = %event.id, error = %err, "outbound encode failed"),
        }
    }

    /// Joins up to `max` queued outbound events into one batch.
    ///
    /// Returns `None` when nothing is queued. The rest stays queued in
    /// order.
    #[must_use]
    pub fn drain_outbound(&self, max: usize) -> Option<String> {
        let events = self.outbound.drain(max);
        if events.is_empty() {
            return None;
        }
        Some(self.codec.join(&events))
    }

    /// Number of outbound events waiting.
    #[must_use]
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    /// Advances timers and animations by `dt`, then flushes emissions.
    pub fn tick(&mut self, dt: Duration) {
        for id in self.timers.advance(dt) {
            debug!(object = %id, "delayed destroy fired");
            if let Err(err) = self.destroy(&id) {
                report(&err, MessageKind::DestroyAfter.as_str(), &id, None);
            }
        }

        let frames = {
            let registry = &mut self.registry;
            let paths = &mut self.paths;
            self.animations.advance(dt.as_secs_f64(), |id, path| {
                let expr = paths.get(path).ok()?;
                get_value(&mut *registry, id, &expr).ok().flatten()
            })
        };
        for frame in frames {
            if !self.registry.is_active(&frame.object) {
                continue;
            }
            match self.write_path(&frame.object, &frame.path, &frame.value) {
                Ok(true) => self.listeners.model_changed(&frame.object, &frame.path),
                Ok(false) => {}
                Err(err) => report(&err, MessageKind::Animate.as_str(), &frame.object, Some(&frame.path)),
            }
            if let Some(event) = &frame.emit {
                self.emit(&frame.object, event, None);
            }
        }

        self.flush_emissions();
    }
}

/// Parses a `data.query` mapping of result key to path.
fn parse_query(value: &Value) -> Result<BTreeMap<String, String>, EventError> {
    let Value::Object(map) = value else {
        return Err(EventError::invalid_field("data.query", "object", value_kind(value)));
    };
    map.iter()
        .map(|(key, path)| match path {
            Value::String(path) => Ok((key.clone(), path.clone())),
            other => Err(EventError::invalid_field(
                format!("data.query.{key}"),
                "path string",
                value_kind(other),
            )),
        })
        .collect()
}
