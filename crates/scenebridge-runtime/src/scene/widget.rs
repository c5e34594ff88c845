//! `Widget`: a clickable UI-ish object.

use super::Transform;
use scenebridge_object::{
    convert, impl_accessible, AccessError, Accessible, AccessorTable, Color, Emission, Method, Property, SceneObject, ToWire, Value,
};
use serde_json::json;

/// Methods: `Click()` emits `Clicked`, `Reset()` clears title and count.
#[derive(Debug, Default)]
pub struct Widget {
    pub name: String,
    pub visible: bool,
    pub title: String,
    pub count: i64,
    pub color: Color,
    pub transform: Transform,
    outbox: Vec<Emission>,
}

impl Widget {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }
}

static WIDGET_TABLE: AccessorTable<Widget> = AccessorTable {
    type_name: "Widget",
    properties: &[
        Property {
            name: "name",
            get: |w: &Widget| w.name.to_wire(),
            set: Some(|w: &mut Widget, v: &Value| {
                w.name = convert("name", v)?;
                Ok(())
            }),
        },
        Property {
            name: "visible",
            get: |w: &Widget| w.visible.to_wire(),
            set: Some(|w: &mut Widget, v: &Value| {
                w.visible = convert("visible", v)?;
                Ok(())
            }),
        },
        Property {
            name: "title",
            get: |w: &Widget| w.title.to_wire(),
            set: Some(|w: &mut Widget, v: &Value| {
                w.title = convert("title", v)?;
                Ok(())
            }),
        },
        Property {
            name: "count",
            get: |w: &Widget| w.count.to_wire(),
            set: Some(|w: &mut Widget, v: &Value| {
                w.count = convert("count", v)?;
                Ok(())
            }),
        },
        Property {
            name: "color",
            get: |w: &Widget| w.color.to_wire(),
            set: Some(|w: &mut Widget, v: &Value| {
                w.color = convert("color", v)?;
                Ok(())
            }),
        },
    ],
    methods: &[
        Method {
            name: "Click",
            call: |w: &mut Widget, _args: &[Value]| {
                w.count = w.count.checked_add(1).ok_or_else(|| AccessError::Failed {
                    method: "Click".to_string(),
                    message: "count overflow".to_string(),
                })?;
                w.outbox.push(Emission::new("Clicked", None));
                Ok(json!(w.count))
            },
        },
        Method {
            name: "Reset",
            call: |w: &mut Widget, _args: &[Value]| {
                w.title.clear();
                w.count = 0;
                Ok(Value::Null)
            },
        },
    ],
};

impl_accessible!(Widget, WIDGET_TABLE);

impl SceneObject for Widget {
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
