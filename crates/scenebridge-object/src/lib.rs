//! Scene object access for SceneBridge.
//!
//! This crate is the SDK scene code implements against. It contains the
//! Path Resolver and the Accessor Layer: everything needed to read, write
//! and call members of live scene objects by textual path, with no runtime
//! reflection.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SDK Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenebridge-types  : ObjectId, CallbackId, ErrorCode        │
//! │  scenebridge-event  : WireEvent, Interests, codecs           │
//! │  scenebridge-object : paths, accessors, SceneObject  ◄ HERE  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`path`] | parse `"transform/position/x"` into steps |
//! | [`resolve`](mod@resolve) | walk steps over an [`ObjectGraph`]; get / set / invoke |
//! | [`access`] | [`Accessible`], [`SceneObject`], static [`AccessorTable`]s |
//! | [`wire`] | [`FromWire`] / [`ToWire`] conversions, [`Vec3`], [`Quat`], [`Color`] |
//! | [`testing`] | in-memory graph for tests |
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
//! let x: PathExpression = "transform/position/x".parse().unwrap();
//! set_value(&mut graph, &root, &x, &json!(4)).unwrap();
//!
//! let position: PathExpression = "transform/position".parse().unwrap();
//! assert_eq!(
//!     get_value(&mut graph, &root, &position).unwrap(),
//!     Some(json!({"x": 4, "y": 0, "z": 0}))
//! );
//! ```

pub mod access;
mod error;
pub mod path;
pub mod resolve;
pub mod testing;
pub mod wire;

pub use access::{expect_args, Accessible, AccessorTable, Emission, Method, Property, SceneObject};
pub use error::{AccessError, PathError, ResolveError};
pub use path::{Arg, PathExpression, Step, StepKind};
pub use resolve::{get_value, invoke, place_value, resolve, set_value, Holder, Key, ObjectGraph, Place};
pub use wire::{convert, number, Color, FromWire, Quat, ToWire, Vec3};

/// Re-exported for [`impl_accessible!`] expansions.
pub use serde_json::Value;
