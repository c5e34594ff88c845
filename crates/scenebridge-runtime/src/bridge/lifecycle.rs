//! Object lifecycle: create, destroy, reparent.
//!
//! ```text
//! Active ──destroy──► Destroying ──children, Destroyed event──► Destroyed (removed, id retired)
//!   │
//!   └──destroy_after(d > 0)──► Active (timer armed) ──fires──► Destroying ──► Destroyed
//! ```
//!
//! No other transitions exist. Destroying a Destroying or retired object
//! is a no-op; an explicit destroy cancels any armed timer.

use super::{report, Bridge};
use crate::registry::{LifecycleState, RemoteObject};
use crate::BridgeError;
use scenebridge_event::{value_kind, EventError, Interests, MessageKind, WireEvent};
use scenebridge_object::{convert, Accessible, ObjectGraph, Quat, ToWire, Value, Vec3};
use scenebridge_types::ObjectId;
use serde_json::Map;
use tracing::{debug, info};

/// Everything needed to create one object.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSpec {
    pub template: String,
    /// Generated when absent.
    pub id: Option<ObjectId>,
    pub parent: Option<ObjectId>,
    pub world_position_stays: bool,
    /// Capabilities attached after the template is instantiated.
    pub components: Vec<String>,
    /// Initial property writes.
    pub update: Option<Map<String, Value>>,
    pub interests: Option<Interests>,
    /// Synthetic events dispatched before `Created`.
    pub pre_events: Vec<Value>,
    /// Synthetic events dispatched after `Created`.
    pub post_events: Vec<Value>,
}

impl CreateSpec {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            id: None,
            parent: None,
            world_position_stays: true,
            components: Vec::new(),
            update: None,
            interests: None,
            pre_events: Vec::new(),
            post_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: ObjectId, world_position_stays: bool) -> Self {
        self.parent = Some(parent);
        self.world_position_stays = world_position_stays;
        self
    }

    #[must_use]
    pub fn with_component(mut self, name: impl Into<String>) -> Self {
        self.components.push(name.into());
        self
    }

    #[must_use]
    pub fn with_update(mut self, update: Map<String, Value>) -> Self {
        self.update = Some(update);
        self
    }

    #[must_use]
    pub fn with_interests(mut self, interests: Interests) -> Self {
        self.interests = Some(interests);
        self
    }

    /// Parses a `Create` message.
    ///
    /// # Errors
    ///
    /// Missing `data.template` (or `data.prefab`), or a field of the wrong
    /// kind.
    pub fn from_event(event: &WireEvent) -> Result<Self, EventError> {
        const KIND: &str = "Create";
        let data = event.require_data()?;
        let template = ["template", "prefab"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
            .ok_or_else(|| EventError::missing_field(KIND, "data.template"))?;

        let mut spec = Self::new(template);
        if !event.id.is_empty() {
            spec.id = Some(event.id.clone());
        }
        if let Some(parent) = non_null(data, "parent") {
            let parent = parent
                .as_str()
                .ok_or_else(|| EventError::invalid_field("data.parent", "string", value_kind(parent)))?;
            spec.parent = Some(ObjectId::from(parent));
        }
        if let Some(stays) = non_null(data, "worldPositionStays") {
            spec.world_position_stays = stays.as_bool().ok_or_else(|| {
                EventError::invalid_field("data.worldPositionStays", "bool", value_kind(stays))
            })?;
        }
        if let Some(components) = non_null(data, "components") {
            spec.components = string_list("data.components", components)?;
        }
        if let Some(update) = non_null(data, "update") {
            let Value::Object(update) = update else {
                return Err(EventError::invalid_field("data.update", "object", value_kind(update)));
            };
            spec.update = Some(update.clone());
        }
        if let Some(interests) = non_null(data, "interests") {
            spec.interests = Some(Interests::from_wire(interests)?);
        }
        if let Some(events) = non_null(data, "preEvents") {
            spec.pre_events = value_list("data.preEvents", events)?;
        }
        if let Some(events) = non_null(data, "postEvents") {
            spec.post_events = value_list("data.postEvents", events)?;
        }
        Ok(spec)
    }
}

fn non_null<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn value_list(field: &str, value: &Value) -> Result<Vec<Value>, EventError> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        other => Err(EventError::invalid_field(field, "array", value_kind(other))),
    }
}

fn string_list(field: &str, value: &Value) -> Result<Vec<String>, EventError> {
    value_list(field, value)?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| EventError::invalid_field(field, "array of strings", value_kind(item)))
        })
        .collect()
}

impl Bridge {
    /// Creates and registers an object, then fires `Created`.
    ///
    /// Order: instantiate, register Active, attach to parent, attach
    /// capabilities, apply `update`, store interests, `preEvents`,
    /// `Created`, `postEvents`. Failures after registration are logged and
    /// do not undo the object.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownTemplate`] or [`BridgeError::DuplicateObjectId`];
    /// nothing is registered in either case.
    pub fn create(&mut self, spec: CreateSpec) -> Result<ObjectId, BridgeError> {
        let CreateSpec {
            template,
            id,
            parent,
            world_position_stays,
            components,
            update,
            interests,
            pre_events,
            post_events,
        } = spec;

        let body = self
            .catalog
            .instantiate(&template)
            .ok_or_else(|| BridgeError::UnknownTemplate(template.clone()))?;
        let id = id.unwrap_or_else(ObjectId::generate);
        self.registry
            .insert(RemoteObject::new(id.clone(), template.as_str(), body))?;
        self.listeners.lifecycle(&id, LifecycleState::Active);

        if let Some(parent) = &parent {
            if let Err(err) = self.reparent(&id, Some(parent), world_position_stays) {
                report(&err, MessageKind::Create.as_str(), &id, None);
            }
        }
        for name in &components {
            if let Err(err) = self.attach_capability(&id, name) {
                report(&err, MessageKind::Create.as_str(), &id, Some(name.as_str()));
            }
        }
        if let Some(update) = &update {
            self.apply_update_bundle(&id, "", update, MessageKind::Create.as_str());
        }
        if let Some(object) = self.registry.get_mut(&id) {
            object.interests = Some(interests.unwrap_or_default());
        }
        info!(object = %id, template = %template, "object created");

        for event in pre_events {
            self.dispatch_synthetic(&id, event);
        }
        self.emit(&id, MessageKind::Created.as_str(), None);
        for event in post_events {
            self.dispatch_synthetic(&id, event);
        }
        self.flush_emissions();
        Ok(id)
    }

    /// Tears an object down, children first.
    ///
    /// Fires `Destroyed` (only its interest query runs) before removal.
    /// Retired or tearing-down ids are a no-op.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] for an id that was never registered;
    /// nothing is emitted.
    pub fn destroy(&mut self, id: &ObjectId) -> Result<(), BridgeError> {
        if self.registry.is_retired(id) {
            debug!(object = %id, "destroy ignored: already destroyed");
            return Ok(());
        }
        let children = {
            let Some(object) = self.registry.get_mut(id) else {
                return Err(BridgeError::UnknownObject(id.clone()));
            };
            if !object.lifecycle.is_active() {
                debug!(object = %id, "destroy ignored: already tearing down");
                return Ok(());
            }
            object.lifecycle = LifecycleState::Destroying;
            object.children.clone()
        };
        self.timers.cancel(id);
        self.animations.cancel(id);
        self.listeners.lifecycle(id, LifecycleState::Destroying);

        for child in &children {
            if let Err(err) = self.destroy(child) {
                report(&err, MessageKind::Destroy.as_str(), child, None);
            }
        }

        self.emit(id, MessageKind::Destroyed.as_str(), None);
        self.registry.remove(id);
        self.listeners.lifecycle(id, LifecycleState::Destroyed);
        info!(object = %id, children = children.len(), "object destroyed");
        Ok(())
    }

    /// Schedules a destroy after `delay`. Re-arming replaces the deadline.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] unless `id` is active.
    pub fn destroy_after(&mut self, id: &ObjectId, delay: std::time::Duration) -> Result<(), BridgeError> {
        self.ensure_active(id)?;
        if delay.is_zero() {
            return self.destroy(id);
        }
        debug!(object = %id, delay_ms = delay.as_millis() as u64, "destroy scheduled");
        self.timers.arm(id.clone(), delay);
        Ok(())
    }

    /// Reads the value at `path`, rooted at `id`.
    ///
    /// Returns `Ok(None)` when an optional step missed.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] for non-active ids, and resolution
    /// errors for non-optional misses.
    pub fn resolve_path(&mut self, id: &ObjectId, path: &str) -> Result<Option<Value>, BridgeError> {
        self.ensure_active(id)?;
        self.read_path(id, path)
    }

    /// Moves `subject` under `parent`, or to the top level with `None`.
    ///
    /// With `world_position_stays`, the subject's local transform is
    /// recomputed so that its world transform is unchanged. Objects
    /// without a `transform` component only move in the hierarchy.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] or [`BridgeError::InvalidParent`]
    /// (not live, or a cycle). The hierarchy is unchanged on error.
    pub fn reparent(
        &mut self,
        subject: &ObjectId,
        parent: Option<&ObjectId>,
        world_position_stays: bool,
    ) -> Result<(), BridgeError> {
        self.ensure_active(subject)?;
        let world = world_position_stays.then(|| self.world_pose(subject));
        self.registry.set_parent(subject, parent)?;

        if let Some(world) = world {
            let parent_world = parent.map_or(Pose::IDENTITY, |p| self.world_pose(p));
            let local = parent_world.relative(&world);
            if let Some(transform) = self.registry.component_mut(subject, "transform") {
                local.write(transform);
            }
        }
        debug!(
            object = %subject,
            parent = parent.map_or("", ObjectId::as_str),
            world_position_stays,
            "reparented"
        );
        self.listeners.model_changed(subject, "transform");
        Ok(())
    }

    /// Attaches a capability from the catalog. Attaching one the object
    /// already has is a no-op.
    pub(crate) fn attach_capability(&mut self, id: &ObjectId, name: &str) -> Result<(), BridgeError> {
        self.ensure_active(id)?;
        let capability = self
            .catalog
            .capability(name)
            .ok_or_else(|| BridgeError::UnknownCapability(name.to_string()))?;
        let Some(object) = self.registry.get_mut(id) else {
            return Err(BridgeError::UnknownObject(id.clone()));
        };
        if object.has_capability(name) || object.body.component(name).is_some() {
            debug!(object = %id, capability = name, "capability already attached");
            return Ok(());
        }
        object.capabilities.push((name.to_string(), capability));
        debug!(object = %id, capability = name, "capability attached");
        self.listeners.model_changed(id, name);
        Ok(())
    }

    /// Detaches a runtime capability. Builtin components cannot be removed.
    pub(crate) fn detach_capability(&mut self, id: &ObjectId, name: &str) -> Result<(), BridgeError> {
        let Some(object) = self.registry.get_mut(id) else {
            return Err(BridgeError::UnknownObject(id.clone()));
        };
        let before = object.capabilities.len();
        object.capabilities.retain(|(n, _)| n != name);
        if object.capabilities.len() == before {
            return Err(BridgeError::UnknownCapability(name.to_string()));
        }
        debug!(object = %id, capability = name, "capability detached");
        self.listeners.model_changed(id, name);
        Ok(())
    }

    /// World pose of `id`, composed over its ancestors.
    fn world_pose(&self, id: &ObjectId) -> Pose {
        let mut pose = Pose::read(self.registry.component(id, "transform"));
        let mut cursor = self.registry.parent(id);
        while let Some(ancestor) = cursor {
            pose = Pose::read(self.registry.component(&ancestor, "transform")).compose(&pose);
            cursor = self.registry.parent(&ancestor);
        }
        pose
    }
}

/// Position, rotation and scale of a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Pose {
    const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    fn read(transform: Option<&dyn Accessible>) -> Self {
        let Some(transform) = transform else {
            return Self::IDENTITY;
        };
        let field = |name: &str| transform.get(name);
        Self {
            position: field("position")
                .and_then(|v| convert("position", &v).ok())
                .unwrap_or(Vec3::ZERO),
            rotation: field("rotation")
                .and_then(|v| convert("rotation", &v).ok())
                .unwrap_or(Quat::IDENTITY),
            scale: field("scale")
                .and_then(|v| convert("scale", &v).ok())
                .unwrap_or(Vec3::ONE),
        }
    }

    fn write(&self, transform: &mut dyn Accessible) {
        let members = transform.member_names();
        for (name, value) in [
            ("position", self.position.to_wire()),
            ("rotation", self.rotation.to_wire()),
            ("scale", self.scale.to_wire()),
        ] {
            if members.contains(&name) {
                if let Err(err) = transform.set(name, &value) {
                    debug!(member = name, error = %err, "transform write skipped");
                }
            }
        }
    }

    /// `self` applied on top of a child's local pose.
    fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation.rotate(self.scale.scale(local.position)),
            rotation: (self.rotation * local.rotation).normalized(),
            scale: self.scale.scale(local.scale),
        }
    }

    /// The local pose that composes with `self` into `world`.
    fn relative(&self, world: &Pose) -> Pose {
        let inverse = self.rotation.inverse();
        Pose {
            position: inverse
                .rotate(world.position - self.position)
                .unscale(self.scale),
            rotation: (inverse * world.rotation).normalized(),
            scale: world.scale.unscale(self.scale),
        }
    }
}
