//! Core types for SceneBridge.
//!
//! This crate provides the identifier types and the error-code contract
//! shared by every layer of the bridge.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SDK Layer                              │
//! │  (Implemented against by scene/host code)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenebridge-types  : ObjectId, CallbackId, ErrorCode ◄ HERE │
//! │  scenebridge-event  : WireEvent, MessageKind, Interests      │
//! │  scenebridge-object : paths, accessors, SceneObject trait    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Runtime Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenebridge-runtime : registry, interests, queues, runner   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Frontend Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenebridge-cli     : stdio bridge binary                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use scenebridge_types::{CallbackId, ObjectId};
//!
//! let widget = ObjectId::from("widget-1");
//! let callback = CallbackId::generate();
//!
//! assert_eq!(widget.as_str(), "widget-1");
//! assert!(callback.as_str().starts_with("cb:"));
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{CallbackId, ListenerId, ObjectId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_roundtrips_as_plain_string() {
        let id = ObjectId::from("obj1");
        let json = serde_json::to_string(&id).expect("ObjectId should serialize");
        assert_eq!(json, "\"obj1\"");

        let restored: ObjectId = serde_json::from_str(&json).expect("ObjectId should deserialize");
        assert_eq!(restored, id);
    }

    #[test]
    fn generated_object_ids_are_unique() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn object_id_borrows_as_str() {
        let mut ids = std::collections::HashSet::new();
        ids.insert(ObjectId::from("a"));
        assert!(ids.contains("a"));
        assert!(!ids.contains("b"));
    }

    #[test]
    fn callback_ids_generated_with_prefix() {
        let id = CallbackId::generate();
        assert!(id.as_str().starts_with("cb:"));
        assert_ne!(id, CallbackId::generate());
    }

    #[test]
    fn listener_id_display() {
        assert_eq!(ListenerId(3).to_string(), "listener:3");
    }
}
