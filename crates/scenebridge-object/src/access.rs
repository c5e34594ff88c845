//! Accessor tables: explicit member dispatch without reflection.
//!
//! Every scene type exposes its members through a static
//! [`AccessorTable`]: a list of named properties (getter plus optional
//! setter) and named methods, all plain function pointers. The
//! [`impl_accessible!`](crate::impl_accessible) macro turns a table into an
//! [`Accessible`] implementation.
//!
//! ```text
//! "visible" ──► AccessorTable<Node>::properties ──► fn(&Node) -> Value
//!                                                  fn(&mut Node, &Value)
//! "Emit"    ──► AccessorTable<Node>::methods    ──► fn(&mut Node, &[Value])
//! ```
//!
//! # Example
//!
//! ```
//! use scenebridge_object::{convert, impl_accessible, Accessible, AccessorTable, Method, Property, ToWire};
//! use serde_json::{json, Value};
//!
//! #[derive(Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! static COUNTER_TABLE: AccessorTable<Counter> = AccessorTable {
//!     type_name: "Counter",
//!     properties: &[Property {
//!         name: "count",
//!         get: |c: &Counter| c.count.to_wire(),
//!         set: Some(|c: &mut Counter, v: &Value| {
//!             c.count = convert("count", v)?;
//!             Ok(())
//!         }),
//!     }],
//!     methods: &[Method {
//!         name: "Increment",
//!         call: |c: &mut Counter, _args: &[Value]| {
//!             c.count += 1;
//!             Ok(c.count.to_wire())
//!         },
//!     }],
//! };
//!
//! impl_accessible!(Counter, COUNTER_TABLE);
//!
//! let mut counter = Counter::default();
//! counter.set("count", &json!(4)).unwrap();
//! assert_eq!(counter.call("Increment", &[]).unwrap(), json!(5));
//! assert_eq!(counter.get("count"), Some(json!(5)));
//! assert!(counter.set("count", &json!("5")).is_err());
//! ```

use crate::AccessError;
use serde_json::{Map, Value};

/// A typed view of one scene object or component.
pub trait Accessible: Send {
    /// Type name used in errors and logs.
    fn type_name(&self) -> &'static str;

    /// Reads a property. `None` when no such property exists.
    fn get(&self, member: &str) -> Option<Value>;

    /// Writes a property, converting from the wire value.
    ///
    /// # Errors
    ///
    /// Unknown member, read-only member, or conversion failure.
    fn set(&mut self, member: &str, value: &Value) -> Result<(), AccessError>;

    /// Invokes a method.
    ///
    /// # Errors
    ///
    /// [`AccessError::UnknownMethod`] unless overridden.
    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, AccessError> {
        Err(AccessError::UnknownMethod {
            type_name: self.type_name().to_string(),
            method: method.to_string(),
        })
    }

    /// Readable property names, in table order.
    fn member_names(&self) -> Vec<&'static str>;

    /// All readable properties as one wire object.
    fn snapshot(&self) -> Value {
        let map: Map<String, Value> = self
            .member_names()
            .into_iter()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect();
        Value::Object(map)
    }
}

/// An event a scene object wants emitted through the interest engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Event name, e.g. `Clicked`.
    pub event: String,
    /// Optional payload.
    pub data: Option<Value>,
}

impl Emission {
    #[must_use]
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// A scene object: an accessible root with builtin components.
///
/// Builtin components (for example a transform) are part of the object
/// itself. Capabilities attached at runtime are held by the registry and
/// looked up next to these.
pub trait SceneObject: Accessible {
    /// Borrows a builtin component.
    fn component(&self, _name: &str) -> Option<&dyn Accessible> {
        None
    }

    /// Mutably borrows a builtin component.
    fn component_mut(&mut self, _name: &str) -> Option<&mut dyn Accessible> {
        None
    }

    /// Names of builtin components.
    fn component_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Drains events the object queued from inside its methods.
    fn take_emissions(&mut self) -> Vec<Emission> {
        Vec::new()
    }

    /// Upcast to the accessible root.
    fn as_accessible(&self) -> &dyn Accessible;

    /// Mutable upcast to the accessible root.
    fn as_accessible_mut(&mut self) -> &mut dyn Accessible;
}

/// A named property with a getter and an optional setter.
pub struct Property<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Value,
    pub set: Option<fn(&mut T, &Value) -> Result<(), AccessError>>,
}

/// A named method.
pub struct Method<T> {
    pub name: &'static str,
    pub call: fn(&mut T, &[Value]) -> Result<Value, AccessError>,
}

/// Static member table for one scene type.
pub struct AccessorTable<T: 'static> {
    pub type_name: &'static str,
    pub properties: &'static [Property<T>],
    pub methods: &'static [Method<T>],
}

impl<T> AccessorTable<T> {
    fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Reads `name` from `target`.
    #[must_use]
    pub fn get(&self, target: &T, name: &str) -> Option<Value> {
        self.property(name).map(|p| (p.get)(target))
    }

    /// Writes `name` on `target`.
    ///
    /// # Errors
    ///
    /// Unknown member, read-only, or the setter's own conversion error.
    pub fn set(&self, target: &mut T, name: &str, value: &Value) -> Result<(), AccessError> {
        let property = self.property(name).ok_or_else(|| AccessError::UnknownMember {
            type_name: self.type_name.to_string(),
            member: name.to_string(),
        })?;
        let setter = property.set.ok_or_else(|| AccessError::ReadOnly {
            type_name: self.type_name.to_string(),
            member: name.to_string(),
        })?;
        setter(target, value)
    }

    /// Invokes `name` on `target`.
    ///
    /// # Errors
    ///
    /// Unknown method, or whatever the method reports.
    pub fn call(&self, target: &mut T, name: &str, args: &[Value]) -> Result<Value, AccessError> {
        let method = self
            .methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| AccessError::UnknownMethod {
                type_name: self.type_name.to_string(),
                method: name.to_string(),
            })?;
        (method.call)(target, args)
    }

    /// Property names in table order.
    #[must_use]
    pub fn member_names(&self) -> Vec<&'static str> {
        self.properties.iter().map(|p| p.name).collect()
    }

    /// Method names in table order.
    #[must_use]
    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.iter().map(|m| m.name).collect()
    }
}

/// Checks a method's argument count.
///
/// # Errors
///
/// [`AccessError::InvalidArguments`] when `args.len() != expected`.
pub fn expect_args(method: &str, args: &[Value], expected: usize) -> Result<(), AccessError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(AccessError::invalid_arguments(
            method,
            format!("expected {expected} argument(s), got {}", args.len()),
        ))
    }
}

/// Implements [`Accessible`] for a type by delegating to a static
/// [`AccessorTable`].
#[macro_export]
macro_rules! impl_accessible {
    ($ty:ty, $table:expr) => {
        impl $crate::Accessible for $ty {
            fn type_name(&self) -> &'static str {
                $table.type_name
            }

            fn get(&self, member: &str) -> Option<$crate::Value> {
                $table.get(self, member)
            }

            fn set(
                &mut self,
                member: &str,
                value: &$crate::Value,
            ) -> Result<(), $crate::AccessError> {
                $table.set(self, member, value)
            }

            fn call(
                &mut self,
                method: &str,
                args: &[$crate::Value],
            ) -> Result<$crate::Value, $crate::AccessError> {
                $table.call(self, method, args)
            }

            fn member_names(&self) -> Vec<&'static str> {
                $table.member_names()
            }
        }
    };
}
