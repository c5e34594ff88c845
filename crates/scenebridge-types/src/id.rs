//! Identifier types for SceneBridge.
//!
//! Object and callback identities cross the wire as plain strings, so both
//! are thin newtypes over `String` with transparent serde representation.
//! Generated identities are UUID v4 strings.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Identity of a remote object.
///
/// Assigned once at creation (either supplied by the remote controller or
/// generated) and never changed. After the object is destroyed its id is
/// retired by the registry and cannot be reused within the process.
///
/// # Example
///
/// ```
/// use scenebridge_types::ObjectId;
///
/// let id = ObjectId::from("obj1");
/// assert_eq!(id.as_str(), "obj1");
/// assert_eq!(id.to_string(), "obj1");
///
/// let generated = ObjectId::generate();
/// assert_ne!(generated, ObjectId::generate());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id, which is never a valid identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Token correlating a query with its single result delivery.
///
/// Remote controllers mint their own callback ids and send them with a
/// `Query` message; in-process callers obtain one from the bridge when
/// registering a listener. Either way a callback id fires at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(String);

impl CallbackId {
    /// Creates a callback id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh callback id, prefixed `cb:` to keep locally minted
    /// ids visually distinct from remote ones in logs.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("cb:{}", Uuid::new_v4()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CallbackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Handle returned when a model listener is registered.
///
/// Sequential per bridge; only meaningful to the bridge that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}
