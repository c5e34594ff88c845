//! Remote Object Registry.
//!
//! The single owner of every [`RemoteObject`]. Objects are keyed by
//! [`ObjectId`]; destroyed ids move to a retired set and can never be
//! registered again within the process.
//!
//! ```text
//! ┌──────────────────────── Registry ────────────────────────┐
//! │ objects: BTreeMap<ObjectId, RemoteObject>                │
//! │   obj1 ─┬─ body: Box<dyn SceneObject>   (Widget, Node…)  │
//! │         ├─ capabilities: [(Tags, Box<dyn Accessible>)]   │
//! │         └─ parent / children (structural hierarchy)      │
//! │ retired: HashSet<ObjectId>                               │
//! └──────────────────────────────────────────────────────────┘
//!                 │ implements ObjectGraph
//!                 ▼
//!        scenebridge_object::resolve / set_value / invoke
//! ```
//!
//! The registry only stores and links; lifecycle policy (cascades, events,
//! timers) lives in [`Bridge`](crate::Bridge).

mod object;

pub use object::{LifecycleState, RemoteObject};

use crate::BridgeError;
use scenebridge_object::{Accessible, Emission, ObjectGraph};
use scenebridge_types::ObjectId;
use std::collections::{BTreeMap, HashSet};

/// Owner of all remote objects.
#[derive(Debug, Default)]
pub struct Registry {
    objects: BTreeMap<ObjectId, RemoteObject>,
    retired: HashSet<ObjectId>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered objects (active or tearing down).
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Returns `true` for ids of destroyed objects.
    #[must_use]
    pub fn is_retired(&self, id: &ObjectId) -> bool {
        self.retired.contains(id)
    }

    /// Returns `true` when the object is registered and active.
    #[must_use]
    pub fn is_active(&self, id: &ObjectId) -> bool {
        self.objects
            .get(id)
            .is_some_and(|o| o.lifecycle.is_active())
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&RemoteObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut RemoteObject> {
        self.objects.get_mut(id)
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().cloned().collect()
    }

    /// Registers a new object.
    ///
    /// # Errors
    ///
    /// [`BridgeError::DuplicateObjectId`] when the id is live or retired,
    /// or empty.
    pub fn insert(&mut self, object: RemoteObject) -> Result<(), BridgeError> {
        let id = object.id().clone();
        if id.is_empty() || self.objects.contains_key(&id) || self.retired.contains(&id) {
            return Err(BridgeError::DuplicateObjectId(id));
        }
        self.objects.insert(id, object);
        Ok(())
    }

    /// Unregisters an object and retires its id.
    ///
    /// Also unlinks it from its parent's child list. Children are not
    /// touched; the caller tears them down first.
    pub fn remove(&mut self, id: &ObjectId) -> Option<RemoteObject> {
        self.unlink(id);
        let mut object = self.objects.remove(id)?;
        object.lifecycle = LifecycleState::Destroyed;
        self.retired.insert(id.clone());
        Some(object)
    }

    /// Returns `true` when `ancestor` is `id` or one of its structural
    /// ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: &ObjectId, id: &ObjectId) -> bool {
        let mut current = Some(id.clone());
        while let Some(cursor) = current {
            if &cursor == ancestor {
                return true;
            }
            current = self.objects.get(&cursor).and_then(|o| o.parent.clone());
        }
        false
    }

    /// Moves `child` under `parent` (or to the top level).
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownObject`] for an unregistered child and
    /// [`BridgeError::InvalidParent`] when the parent is not active or the
    /// move would create a cycle.
    pub fn set_parent(&mut self, child: &ObjectId, parent: Option<&ObjectId>) -> Result<(), BridgeError> {
        if !self.objects.contains_key(child) {
            return Err(BridgeError::UnknownObject(child.clone()));
        }
        if let Some(parent) = parent {
            if !self.is_active(parent) {
                return Err(BridgeError::invalid_parent(
                    child,
                    format!("`{parent}` is not a live object"),
                ));
            }
            if self.is_ancestor_or_self(child, parent) {
                return Err(BridgeError::invalid_parent(
                    child,
                    format!("`{parent}` is `{child}` or one of its descendants"),
                ));
            }
        }

        self.unlink(child);
        if let Some(parent) = parent {
            if let Some(p) = self.objects.get_mut(parent) {
                p.children.push(child.clone());
            }
        }
        if let Some(c) = self.objects.get_mut(child) {
            c.parent = parent.cloned();
        }
        Ok(())
    }

    /// Drains queued emissions of every active object, in id order.
    pub fn take_emissions(&mut self) -> Vec<(ObjectId, Emission)> {
        self.objects
            .iter_mut()
            .filter(|(_, o)| o.lifecycle.is_active())
            .flat_map(|(id, o)| {
                o.body
                    .take_emissions()
                    .into_iter()
                    .map(|e| (id.clone(), e))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn unlink(&mut self, child: &ObjectId) {
        let Some(parent) = self.objects.get(child).and_then(|o| o.parent.clone()) else {
            return;
        };
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.retain(|c| c != child);
        }
        if let Some(c) = self.objects.get_mut(child) {
            c.parent = None;
        }
    }
}

impl ObjectGraph for Registry {
    fn object(&self, id: &ObjectId) -> Option<&dyn Accessible> {
        self.objects.get(id).map(|o| o.body.as_accessible())
    }

    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut dyn Accessible> {
        self.objects.get_mut(id).map(|o| o.body.as_accessible_mut())
    }

    fn component(&self, id: &ObjectId, name: &str) -> Option<&dyn Accessible> {
        self.objects.get(id).and_then(|o| o.component(name))
    }

    fn component_mut(&mut self, id: &ObjectId, name: &str) -> Option<&mut dyn Accessible> {
        self.objects.get_mut(id).and_then(|o| o.component_mut(name))
    }

    fn parent(&self, id: &ObjectId) -> Option<ObjectId> {
        self.objects.get(id).and_then(|o| o.parent.clone())
    }

    fn child_named(&self, id: &ObjectId, name: &str) -> Option<ObjectId> {
        self.objects.get(id).and_then(|o| {
            o.children
                .iter()
                .find(|child| {
                    self.objects
                        .get(*child)
                        .and_then(RemoteObject::name)
                        .is_some_and(|n| n == name)
                })
                .cloned()
        })
    }
}
