//! Remote object records.

use scenebridge_event::Interests;
use scenebridge_object::{Accessible, SceneObject};
use scenebridge_types::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a remote object.
///
/// ```text
/// Active ──destroy──► Destroying ──teardown──► Destroyed
/// ```
///
/// Transitions are monotonic; an object never returns to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Active,
    Destroying,
    Destroyed,
}

impl LifecycleState {
    /// Returns `true` only for [`Active`](Self::Active).
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
        })
    }
}

/// The bridge-side proxy of one scene object.
///
/// Owned exclusively by the [`Registry`](super::Registry). Everything else
/// refers to it by [`ObjectId`].
pub struct RemoteObject {
    id: ObjectId,
    template: String,
    pub(crate) interests: Option<Interests>,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) body: Box<dyn SceneObject>,
    pub(crate) capabilities: Vec<(String, Box<dyn Accessible>)>,
}

impl RemoteObject {
    /// Creates an active, unparented object with no interests.
    #[must_use]
    pub fn new(id: ObjectId, template: impl Into<String>, body: Box<dyn SceneObject>) -> Self {
        Self {
            id,
            template: template.into(),
            interests: None,
            lifecycle: LifecycleState::Active,
            parent: None,
            children: Vec::new(),
            body,
            capabilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Template the object was instantiated from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Interests, or `None` if none were ever registered.
    #[must_use]
    pub fn interests(&self) -> Option<&Interests> {
        self.interests.as_ref()
    }

    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    #[must_use]
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// The scene object itself.
    #[must_use]
    pub fn body(&self) -> &dyn SceneObject {
        self.body.as_ref()
    }

    /// Names of builtin components followed by attached capabilities.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.body
            .component_names()
            .into_iter()
            .map(str::to_string)
            .chain(self.capabilities.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Returns `true` when a capability with this name is attached.
    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|(n, _)| n == name)
    }

    /// Builtin component first, then attached capability.
    pub(crate) fn component(&self, name: &str) -> Option<&dyn Accessible> {
        self.body.component(name).or_else(|| {
            self.capabilities
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, c)| c.as_ref())
        })
    }

    pub(crate) fn component_mut(&mut self, name: &str) -> Option<&mut dyn Accessible> {
        if self.body.component(name).is_some() {
            return self.body.component_mut(name);
        }
        self.capabilities
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_mut() as &mut dyn Accessible)
    }

    /// Display name: the `name` property, if the object has one.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.body
            .as_accessible()
            .get("name")
            .and_then(|v| v.as_str().map(str::to_string))
    }
}

impl fmt::Debug for RemoteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteObject")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("lifecycle", &self.lifecycle)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.component_names())
            .finish_non_exhaustive()
    }
}
