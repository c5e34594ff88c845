//! Interest specifications.
//!
//! An interest is a per-event-name subscription attached to a remote object.
//! It controls whether an emission crosses the wire and which side effects
//! and query enrichment happen on the way.
//!
//! # Wire Form
//!
//! ```text
//! {
//!   "Clicked": {
//!     "disabled": false,
//!     "update":   { "visible": false },
//!     "events":   [ { "event": "Update", "data": { "count": 0 } } ],
//!     "query":    { "pos": "transform/position" },
//!     "doNotSend": false
//!   }
//! }
//! ```
//!
//! # Update Semantics
//!
//! [`Interests::apply_update`] merges one incoming value per event name:
//!
//! | Incoming | Effect |
//! |----------|--------|
//! | `null` | remove the entry |
//! | `true` / `false` | `disabled = !value`, other fields untouched |
//! | object | shallow merge of its keys (installs the entry if absent) |
//!
//! Only one spec exists per event name.

use crate::{value_kind, EventError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Subscription for a single event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterestSpec {
    /// Temporarily off without forgetting the rest of the spec.
    pub disabled: bool,
    /// Property writes applied to the emitting object before sending.
    pub update: Option<Map<String, Value>>,
    /// Synthetic inbound events replayed against the emitting object.
    pub events: Option<Vec<Value>>,
    /// Result field name to path expression, evaluated at send time.
    pub query: Option<BTreeMap<String, String>>,
    /// Run the side effects but keep the event off the wire.
    pub do_not_send: bool,
}

impl InterestSpec {
    /// A spec that only sends the event, with no side effects.
    #[must_use]
    pub fn send() -> Self {
        Self::default()
    }

    /// Adds a query field.
    #[must_use]
    pub fn with_query(mut self, field: impl Into<String>, path: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), path.into());
        self
    }

    /// Sets `disabled`.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets `doNotSend`.
    #[must_use]
    pub fn do_not_send(mut self, do_not_send: bool) -> Self {
        self.do_not_send = do_not_send;
        self
    }

    /// Overlays the keys of `incoming` on this spec.
    fn merge_object(&mut self, name: &str, incoming: &Map<String, Value>) -> Result<(), EventError> {
        let mut current = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(EventError::invalid_field(name, "object", value_kind(&other)));
            }
            Err(e) => return Err(EventError::Decode(e.to_string())),
        };
        for (key, value) in incoming {
            current.insert(key.clone(), value.clone());
        }
        *self = serde_json::from_value(Value::Object(current))
            .map_err(|e| EventError::invalid_field(name, "interest spec", e.to_string()))?;
        Ok(())
    }
}

/// All interests of one object, keyed by event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interests {
    entries: BTreeMap<String, InterestSpec>,
}

impl Interests {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds interests from a wire mapping (the `interests` field of
    /// `Create`), using the same merge rules as `UpdateInterests`.
    ///
    /// # Errors
    ///
    /// Fails on the first entry whose value is not `null`, a bool or an
    /// object, or when `value` itself is not an object.
    pub fn from_wire(value: &Value) -> Result<Self, EventError> {
        let Value::Object(map) = value else {
            return Err(EventError::invalid_field(
                "interests",
                "object",
                value_kind(value),
            ));
        };
        let mut interests = Self::new();
        for (name, entry) in map {
            interests.apply_update(name, entry)?;
        }
        Ok(interests)
    }

    /// Returns the spec for `event_name`, if any.
    #[must_use]
    pub fn get(&self, event_name: &str) -> Option<&InterestSpec> {
        self.entries.get(event_name)
    }

    /// Installs or replaces the spec for `event_name`.
    pub fn insert(&mut self, event_name: impl Into<String>, spec: InterestSpec) {
        self.entries.insert(event_name.into(), spec);
    }

    /// Removes the spec for `event_name`.
    pub fn remove(&mut self, event_name: &str) -> Option<InterestSpec> {
        self.entries.remove(event_name)
    }

    /// Number of registered event names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no event names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over registered event names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merges one incoming value into the entry for `event_name`.
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidField`] when `incoming` is a number, string or
    /// array, or when an object overlay produces an invalid spec. The entry
    /// is left unchanged on error.
    pub fn apply_update(&mut self, event_name: &str, incoming: &Value) -> Result<(), EventError> {
        match incoming {
            Value::Null => {
                self.entries.remove(event_name);
            }
            Value::Bool(enabled) => {
                self.entries
                    .entry(event_name.to_string())
                    .or_default()
                    .disabled = !enabled;
            }
            Value::Object(overlay) => {
                let mut spec = self.entries.get(event_name).cloned().unwrap_or_default();
                spec.merge_object(event_name, overlay)?;
                self.entries.insert(event_name.to_string(), spec);
            }
            other => {
                return Err(EventError::invalid_field(
                    event_name,
                    "bool, object or null",
                    value_kind(other),
                ));
            }
        }
        Ok(())
    }

    /// Applies every entry of an `UpdateInterests` payload.
    ///
    /// Entries are independent: a bad entry is reported and the rest still
    /// apply. Returns the errors in payload order.
    pub fn apply_updates(&mut self, updates: &Map<String, Value>) -> Vec<EventError> {
        updates
            .iter()
            .filter_map(|(name, incoming)| self.apply_update(name, incoming).err())
            .collect()
    }
}
