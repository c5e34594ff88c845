//! Object Lifecycle Manager handlers.
//!
//! One handler per inbound message kind. Each takes the target object id
//! and the optional subject `path` of the message. Handlers return
//! `Result`, but per-key failures inside bundles (update keys, query
//! paths, interest entries) are logged and never abort their siblings.

use super::animation::AnimationStep;
use super::path_cache::join_path;
use super::{report, Bridge, Delivery};
use crate::BridgeError;
use scenebridge_event::{MessageKind, WireEvent};
use scenebridge_object::{resolve, set_value, Holder, Place, ResolveError};
use scenebridge_types::{CallbackId, ObjectId};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};

impl Bridge {
    /// `Create`: see [`Bridge::create`].
    ///
    /// # Errors
    ///
    /// As [`Bridge::create`].
    pub fn handle_create(&mut self, spec: super::CreateSpec) -> Result<ObjectId, BridgeError> {
        self.create(spec)
    }

    /// `Update`: applies every key of `bundle` under the subject `path`.
    ///
    /// Keys are paths; a `method:` key invokes the method with the value
    /// as its arguments (an array is positional, anything else a single
    /// argument). Returns the number of keys applied.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] unless `id` is active.
    pub fn handle_update(&mut self, id: &ObjectId, bundle: &Map<String, Value>, path: &str) -> Result<usize, BridgeError> {
        self.ensure_active(id)?;
        Ok(self.apply_update_bundle(id, path, bundle, MessageKind::Update.as_str()))
    }

    /// `Query`: evaluates every path of `query` under the subject `path`.
    ///
    /// The result has exactly the mapping's keys, `null` where a path
    /// failed. With a callback id the result is routed once: to a local
    /// [`QueryListener`](super::QueryListener), or to the remote side as an
    /// outbound `Callback` event.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] unless `id` is active.
    pub fn handle_query(
        &mut self,
        id: &ObjectId,
        query: &BTreeMap<String, String>,
        callback: Option<&CallbackId>,
        path: &str,
    ) -> Result<Value, BridgeError> {
        self.ensure_active(id)?;
        let result = Value::Object(self.evaluate_query(id, path, query, MessageKind::Query.as_str()));

        if let Some(callback) = callback {
            match self.callbacks.route(callback, id, &result) {
                Ok(Delivery::Local) => trace!(object = %id, callback = %callback, "query delivered locally"),
                Ok(Delivery::Remote) => {
                    let event = WireEvent::new(MessageKind::Callback.as_str(), id.clone())
                        .with_data(json!({ "callbackID": callback, "result": result }));
                    self.enqueue_outbound(&event);
                }
                Err(err) => report(&err, MessageKind::Query.as_str(), id, Some(path)),
            }
        }
        Ok(result)
    }

    /// `Animate`: replaces the object's animation track.
    ///
    /// Step paths are relative to the subject `path`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] unless `id` is active.
    pub fn handle_animate(&mut self, id: &ObjectId, steps: Vec<AnimationStep>, path: &str) -> Result<(), BridgeError> {
        self.ensure_active(id)?;
        let steps: Vec<_> = steps.into_iter().map(|s| s.rooted_at(path)).collect();
        debug!(object = %id, steps = steps.len(), "animation started");
        self.animations.start(id.clone(), steps);
        Ok(())
    }

    /// `AddComponent`: attaches capability `class_name` to the subject.
    ///
    /// # Errors
    ///
    /// Unknown object or capability, or a subject path that does not
    /// name an object.
    pub fn handle_add_component(&mut self, id: &ObjectId, class_name: &str, path: &str) -> Result<(), BridgeError> {
        match self.resolve_subject(id, path)? {
            Some(subject) => self.attach_capability(&subject, class_name),
            None => Ok(()),
        }
    }

    /// `SetParent`: moves the subject under the object at `parent_path`
    /// (resolved from `id`), or detaches it when `parent_path` is empty.
    ///
    /// # Errors
    ///
    /// Resolution failures and [`BridgeError::InvalidParent`].
    pub fn handle_set_parent(
        &mut self,
        id: &ObjectId,
        parent_path: &str,
        world_position_stays: bool,
        path: &str,
    ) -> Result<(), BridgeError> {
        let Some(subject) = self.resolve_subject(id, path)? else {
            return Ok(());
        };
        if parent_path.is_empty() {
            return self.reparent(&subject, None, world_position_stays);
        }
        let Some(parent) = self.resolve_subject(id, parent_path)? else {
            return Ok(());
        };
        self.reparent(&subject, Some(&parent), world_position_stays)
    }

    /// `Destroy`: destroys the subject. A path naming an attached
    /// capability detaches that capability instead.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] for never-registered ids; already
    /// destroyed ids are a no-op.
    pub fn handle_destroy(&mut self, id: &ObjectId, path: &str) -> Result<(), BridgeError> {
        if path.is_empty() {
            return self.destroy(id);
        }
        match self.resolve_place(id, path)? {
            None => Ok(()),
            Some(Place::Holder(Holder::Object(target))) => self.destroy(&target),
            Some(Place::Holder(Holder::Component(owner, name))) => self.detach_capability(&owner, &name),
            Some(_) => Err(BridgeError::resolve(
                id,
                ResolveError::not_writable(path, "destroy needs an object or capability"),
            )),
        }
    }

    /// `DestroyAfter`: destroys the subject after `delay` seconds. A delay
    /// of zero or less destroys immediately.
    ///
    /// # Errors
    ///
    /// Unknown object, unresolved path, or a delay that is not finite or
    /// too large for a [`Duration`].
    pub fn handle_destroy_after(&mut self, id: &ObjectId, delay: f64, path: &str) -> Result<(), BridgeError> {
        if !delay.is_finite() {
            return Err(BridgeError::InvalidMessage(scenebridge_event::EventError::invalid_field(
                "data.delay",
                "finite number",
                delay.to_string(),
            )));
        }
        let Some(subject) = self.resolve_subject(id, path)? else {
            return Ok(());
        };
        if delay <= 0.0 {
            return self.destroy(&subject);
        }
        let delay = Duration::try_from_secs_f64(delay).map_err(|_| {
            BridgeError::InvalidMessage(scenebridge_event::EventError::invalid_field(
                "data.delay",
                "representable duration",
                delay.to_string(),
            ))
        })?;
        self.destroy_after(&subject, delay)
    }

    /// `UpdateInterests`: merges `updates` into the subject's interests.
    ///
    /// Bad entries are logged; the rest still apply.
    ///
    /// # Errors
    ///
    /// Unknown object or unresolved subject path.
    pub fn handle_update_interests(&mut self, id: &ObjectId, updates: &Map<String, Value>, path: &str) -> Result<(), BridgeError> {
        let Some(subject) = self.resolve_subject(id, path)? else {
            return Ok(());
        };
        let Some(object) = self.registry.get_mut(&subject) else {
            return Err(BridgeError::UnknownObject(subject));
        };
        let errors = object
            .interests
            .get_or_insert_with(Default::default)
            .apply_updates(updates);
        for err in errors {
            report(
                &BridgeError::InvalidMessage(err),
                MessageKind::UpdateInterests.as_str(),
                &subject,
                None,
            );
        }
        debug!(object = %subject, entries = updates.len(), "interests updated");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Writes every key of `bundle` under `subject`, logging failures per
    /// key. Returns the number of keys applied.
    pub(crate) fn apply_update_bundle(
        &mut self,
        id: &ObjectId,
        subject: &str,
        bundle: &Map<String, Value>,
        event: &str,
    ) -> usize {
        let mut applied = 0;
        for (key, value) in bundle {
            let full = join_path(subject, key);
            match self.write_path(id, &full, value) {
                Ok(true) => {
                    applied += 1;
                    self.listeners.model_changed(id, &full);
                }
                Ok(false) => trace!(object = %id, path = %full, "optional update skipped"),
                Err(err) => report(&err, event, id, Some(&full)),
            }
        }
        applied
    }

    pub(crate) fn write_path(&mut self, id: &ObjectId, path: &str, value: &Value) -> Result<bool, BridgeError> {
        let expr = self.parse_path(id, path)?;
        set_value(&mut self.registry, id, &expr, value).map_err(|e| BridgeError::resolve(id, e))
    }

    /// Resolves a subject path to a place. The empty path is the object.
    fn resolve_place(&mut self, id: &ObjectId, path: &str) -> Result<Option<Place>, BridgeError> {
        self.ensure_active(id)?;
        if path.is_empty() {
            return Ok(Some(Place::Holder(Holder::Object(id.clone()))));
        }
        let expr = self.parse_path(id, path)?;
        resolve(&mut self.registry, id, &expr).map_err(|e| BridgeError::resolve(id, e))
    }

    /// Resolves a subject path that must name an object.
    fn resolve_subject(&mut self, id: &ObjectId, path: &str) -> Result<Option<ObjectId>, BridgeError> {
        match self.resolve_place(id, path)? {
            None => Ok(None),
            Some(Place::Holder(Holder::Object(subject))) => Ok(Some(subject)),
            Some(_) => Err(BridgeError::resolve(
                id,
                ResolveError::unresolved(0, path, "path does not name an object"),
            )),
        }
    }
}
