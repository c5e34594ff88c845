//! Builtin scene types and the template catalog.
//!
//! | Template | Type | Builtin components |
//! |----------|------|--------------------|
//! | `Node` | [`Node`] | `transform` |
//! | `Widget` | [`Widget`] | `transform` |
//!
//! | Capability | Type |
//! |------------|------|
//! | `Tags` | [`Tags`] |
//! | `Metadata` | [`Metadata`] |
//! | `Highlight` | [`Highlight`] |
//!
//! Hosts register their own types with
//! [`TemplateCatalog::register_template`] and
//! [`TemplateCatalog::register_capability`].

mod capability;
mod node;
mod transform;
mod widget;

pub use capability::{Highlight, Metadata, Tags};
pub use node::Node;
pub use transform::Transform;
pub use widget::Widget;

use scenebridge_object::{Accessible, SceneObject};
use std::collections::BTreeMap;
use std::fmt;

/// Builds a fresh scene object.
pub type TemplateFactory = fn() -> Box<dyn SceneObject>;

/// Builds a fresh capability.
pub type CapabilityFactory = fn() -> Box<dyn Accessible>;

/// Named factories for `Create` and `AddComponent`.
#[derive(Clone, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, TemplateFactory>,
    capabilities: BTreeMap<String, CapabilityFactory>,
}

impl TemplateCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with the builtin templates and capabilities.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register_template("Node", || Box::new(Node::new()));
        catalog.register_template("Widget", || Box::new(Widget::new()));
        catalog.register_capability("Tags", || Box::new(Tags::default()));
        catalog.register_capability("Metadata", || Box::new(Metadata::default()));
        catalog.register_capability("Highlight", || Box::new(Highlight::default()));
        catalog
    }

    /// Registers or replaces a template.
    pub fn register_template(&mut self, name: impl Into<String>, factory: TemplateFactory) {
        self.templates.insert(name.into(), factory);
    }

    /// Registers or replaces a capability.
    pub fn register_capability(&mut self, name: impl Into<String>, factory: CapabilityFactory) {
        self.capabilities.insert(name.into(), factory);
    }

    /// Instantiates a template by name.
    #[must_use]
    pub fn instantiate(&self, template: &str) -> Option<Box<dyn SceneObject>> {
        self.templates.get(template).map(|factory| factory())
    }

    /// Instantiates a capability by name.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<Box<dyn Accessible>> {
        self.capabilities.get(name).map(|factory| factory())
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }
}

impl fmt::Debug for TemplateCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCatalog")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("capabilities", &self.capabilities.keys().collect::<Vec<_>>())
            .finish()
    }
}
