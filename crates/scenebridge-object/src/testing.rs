//! In-memory object graph for exercising paths and accessors without a
//! runtime.
//!
//! # Example
//!
//! ```
//! use scenebridge_object::testing::TestGraph;
//! use scenebridge_object::{get_value, set_value, PathExpression};
//! use serde_json::json;
//!
//! let mut graph = TestGraph::new();
//! let root = graph.add_node("root", None);
//!
//! let title = PathExpression::parse("title").unwrap();
//! set_value(&mut graph, &root, &title, &json!("Hello")).unwrap();
//! assert_eq!(get_value(&mut graph, &root, &title).unwrap(), Some(json!("Hello")));
//! ```

use crate::access::{expect_args, AccessorTable, Method, Property};
use crate::{convert, number, AccessError, Accessible, Emission, ObjectGraph, Quat, SceneObject, ToWire, Vec3};
use scenebridge_types::ObjectId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Minimal transform component.
#[derive(Debug, Clone, Default)]
pub struct TestTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

static TEST_TRANSFORM_TABLE: AccessorTable<TestTransform> = AccessorTable {
    type_name: "TestTransform",
    properties: &[
        Property {
            name: "position",
            get: |t: &TestTransform| t.position.to_wire(),
            set: Some(|t: &mut TestTransform, v: &Value| {
                t.position = convert("position", v)?;
                Ok(())
            }),
        },
        Property {
            name: "rotation",
            get: |t: &TestTransform| t.rotation.to_wire(),
            set: Some(|t: &mut TestTransform, v: &Value| {
                t.rotation = convert("rotation", v)?;
                Ok(())
            }),
        },
    ],
    methods: &[],
};

crate::impl_accessible!(TestTransform, TEST_TRANSFORM_TABLE);

/// Minimal scene object with a `transform` component.
///
/// Methods: `Add(a, b)`, `Bump(n)`, `Echo(x)`, `Fail()`, `Ping()` (queues a
/// `Pinged` emission).
#[derive(Debug, Default)]
pub struct TestNode {
    pub name: String,
    pub title: String,
    pub count: i64,
    pub items: Vec<Value>,
    pub data: Map<String, Value>,
    pub transform: TestTransform,
    pub outbox: Vec<Emission>,
}

fn number_arg(method: &str, value: &Value) -> Result<f64, AccessError> {
    value
        .as_f64()
        .ok_or_else(|| AccessError::invalid_arguments(method, "expected numbers"))
}

static TEST_NODE_TABLE: AccessorTable<TestNode> = AccessorTable {
    type_name: "TestNode",
    properties: &[
        Property {
            name: "name",
            get: |n: &TestNode| n.name.to_wire(),
            set: Some(|n: &mut TestNode, v: &Value| {
                n.name = convert("name", v)?;
                Ok(())
            }),
        },
        Property {
            name: "title",
            get: |n: &TestNode| n.title.to_wire(),
            set: Some(|n: &mut TestNode, v: &Value| {
                n.title = convert("title", v)?;
                Ok(())
            }),
        },
        Property {
            name: "count",
            get: |n: &TestNode| n.count.to_wire(),
            set: Some(|n: &mut TestNode, v: &Value| {
                n.count = convert("count", v)?;
                Ok(())
            }),
        },
        Property {
            name: "items",
            get: |n: &TestNode| n.items.to_wire(),
            set: Some(|n: &mut TestNode, v: &Value| {
                n.items = convert("items", v)?;
                Ok(())
            }),
        },
        Property {
            name: "data",
            get: |n: &TestNode| n.data.to_wire(),
            set: Some(|n: &mut TestNode, v: &Value| {
                n.data = convert("data", v)?;
                Ok(())
            }),
        },
    ],
    methods: &[
        Method {
            name: "Add",
            call: |_n: &mut TestNode, args: &[Value]| {
                expect_args("Add", args, 2)?;
                Ok(number(number_arg("Add", &args[0])? + number_arg("Add", &args[1])?))
            },
        },
        Method {
            name: "Bump",
            call: |n: &mut TestNode, args: &[Value]| {
                expect_args("Bump", args, 1)?;
                n.count += convert::<i64>("n", &args[0])?;
                Ok(n.count.to_wire())
            },
        },
        Method {
            name: "Echo",
            call: |_n: &mut TestNode, args: &[Value]| {
                expect_args("Echo", args, 1)?;
                Ok(args[0].clone())
            },
        },
        Method {
            name: "Fail",
            call: |_n: &mut TestNode, _args: &[Value]| {
                Err(AccessError::Failed {
                    method: "Fail".into(),
                    message: "always fails".into(),
                })
            },
        },
        Method {
            name: "Ping",
            call: |n: &mut TestNode, _args: &[Value]| {
                n.outbox.push(Emission::new("Pinged", None));
                Ok(Value::Null)
            },
        },
    ],
};

crate::impl_accessible!(TestNode, TEST_NODE_TABLE);

impl SceneObject for TestNode {
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

struct Entry {
    node: TestNode,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
}

/// A flat map of [`TestNode`]s with parent links.
#[derive(Default)]
pub struct TestGraph {
    entries: BTreeMap<ObjectId, Entry>,
    next: u64,
}

impl TestGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node named `name` and returns its generated id (`n1`, `n2`, ...).
    ///
    /// # Panics
    ///
    /// If `parent` is not in the graph.
    pub fn add_node(&mut self, name: &str, parent: Option<&ObjectId>) -> ObjectId {
        self.next += 1;
        let id = ObjectId::new(format!("n{}", self.next));
        if let Some(parent) = parent {
            self.entries
                .get_mut(parent)
                .unwrap_or_else(|| panic!("parent {parent} not in graph"))
                .children
                .push(id.clone());
        }
        let node = TestNode {
            name: name.to_string(),
            ..TestNode::default()
        };
        self.entries.insert(
            id.clone(),
            Entry {
                node,
                parent: parent.cloned(),
                children: Vec::new(),
            },
        );
        id
    }

    /// # Panics
    ///
    /// If `id` is not in the graph.
    #[must_use]
    pub fn node(&self, id: &ObjectId) -> &TestNode {
        &self.entries.get(id).unwrap_or_else(|| panic!("{id} not in graph")).node
    }

    /// # Panics
    ///
    /// If `id` is not in the graph.
    pub fn node_mut(&mut self, id: &ObjectId) -> &mut TestNode {
        &mut self
            .entries
            .get_mut(id)
            .unwrap_or_else(|| panic!("{id} not in graph"))
            .node
    }

    /// # Panics
    ///
    /// If `id` is not in the graph.
    #[must_use]
    pub fn transform(&self, id: &ObjectId) -> &TestTransform {
        &self.node(id).transform
    }

    /// # Panics
    ///
    /// If `id` is not in the graph.
    pub fn transform_mut(&mut self, id: &ObjectId) -> &mut TestTransform {
        &mut self.node_mut(id).transform
    }
}

impl ObjectGraph for TestGraph {
    fn object(&self, id: &ObjectId) -> Option<&dyn Accessible> {
        self.entries.get(id).map(|e| e.node.as_accessible())
    }

    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut dyn Accessible> {
        self.entries.get_mut(id).map(|e| e.node.as_accessible_mut())
    }

    fn component(&self, id: &ObjectId, name: &str) -> Option<&dyn Accessible> {
        self.entries.get(id).and_then(|e| e.node.component(name))
    }

    fn component_mut(&mut self, id: &ObjectId, name: &str) -> Option<&mut dyn Accessible> {
        self.entries.get_mut(id).and_then(|e| e.node.component_mut(name))
    }

    fn parent(&self, id: &ObjectId) -> Option<ObjectId> {
        self.entries.get(id).and_then(|e| e.parent.clone())
    }

    fn child_named(&self, id: &ObjectId, name: &str) -> Option<ObjectId> {
        self.entries.get(id).and_then(|e| {
            e.children
                .iter()
                .find(|child| self.entries.get(*child).is_some_and(|c| c.node.name == name))
                .cloned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_lists_transform_component() {
        let mut graph = TestGraph::new();
        let id = graph.add_node("a", None);
        assert_eq!(graph.node(&id).component_names(), vec!["transform"]);
        assert!(graph.component(&id, "transform").is_some());
        assert!(graph.component(&id, "Tags").is_none());
    }

    #[test]
    fn ping_queues_emission() {
        let mut graph = TestGraph::new();
        let id = graph.add_node("a", None);
        graph
            .node_mut(&id)
            .call("Ping", &[])
            .expect("Ping should succeed");
        let emitted = graph.node_mut(&id).take_emissions();
        assert_eq!(emitted, vec![Emission::new("Pinged", None)]);
        assert!(graph.node_mut(&id).take_emissions().is_empty());
    }

    #[test]
    fn add_rejects_non_numbers() {
        let mut graph = TestGraph::new();
        let id = graph.add_node("a", None);
        assert!(graph.node_mut(&id).call("Add", &[json!("1"), json!(2)]).is_err());
    }
}
