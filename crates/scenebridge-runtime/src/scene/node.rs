//! `Node`: the general-purpose scene object.

use super::Transform;
use scenebridge_object::{
    convert, impl_accessible, AccessError, Accessible, AccessorTable, Color, Emission, Method, Property, SceneObject,
    ToWire, Value,
};
use serde_json::Map;

/// A named, taggable object with free-form data.
///
/// Methods: `Emit(event, data?)` queues an application event from the
/// node itself.
#[derive(Debug, Default)]
pub struct Node {
    pub name: String,
    pub tag: String,
    pub visible: bool,
    pub color: Color,
    pub data: Map<String, Value>,
    pub items: Vec<Value>,
    pub transform: Transform,
    outbox: Vec<Emission>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }
}

static NODE_TABLE: AccessorTable<Node> = AccessorTable {
    type_name: "Node",
    properties: &[
        Property {
            name: "name",
            get: |n: &Node| n.name.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.name = convert("name", v)?;
                Ok(())
            }),
        },
        Property {
            name: "tag",
            get: |n: &Node| n.tag.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.tag = convert("tag", v)?;
                Ok(())
            }),
        },
        Property {
            name: "visible",
            get: |n: &Node| n.visible.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.visible = convert("visible", v)?;
                Ok(())
            }),
        },
        Property {
            name: "color",
            get: |n: &Node| n.color.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.color = convert("color", v)?;
                Ok(())
            }),
        },
        Property {
            name: "data",
            get: |n: &Node| n.data.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.data = convert("data", v)?;
                Ok(())
            }),
        },
        Property {
            name: "items",
            get: |n: &Node| n.items.to_wire(),
            set: Some(|n: &mut Node, v: &Value| {
                n.items = convert("items", v)?;
                Ok(())
            }),
        },
    ],
    methods: &[Method {
        name: "Emit",
        call: |n: &mut Node, args: &[Value]| {
            let (event, data) = match args {
                [event] => (event, None),
                [event, data] => (event, Some(data.clone())),
                _ => {
                    return Err(AccessError::invalid_arguments(
                        "Emit",
                        format!("expected event and optional data, got {} argument(s)", args.len()),
                    ))
                }
            };
            let event: String = convert("event", event)?;
            n.outbox.push(Emission::new(event, data));
            Ok(Value::Null)
        },
    }],
};

impl_accessible!(Node, NODE_TABLE);

impl SceneObject for Node {
    fn component(&self, name: &str) -> Option<&dyn Accessible> {
        (name == "transform").then_some(&self.transform as &dyn Accessible)
    }

    fn component_mut(&mut self, name: &str) -> Option<&mut dyn Accessible> {
        (name == "transform").then_some(&mut self.transform as &mut dyn Accessible)
    }

    fn component_names(&self) -> Vec<&'static str> {
        vec!["transform"]
    }

    fn take_emissions(&mut self) -> Vec<Emission> {
        std::mem::take(&mut self.outbox)
    }

    fn as_accessible(&self) -> &dyn Accessible {
        self
    }

    fn as_accessible_mut(&mut self) -> &mut dyn Accessible {
        self
    }
}
