//! The wire envelope.
//!
//! Every message in either direction is one JSON object:
//!
//! ```text
//! { "event": "Update", "id": "obj1", "data": { ... }, "path": "transform" }
//! ```
//!
//! `data` and `path` are optional and omitted from the encoding when absent.
//! `id` is always the addressed (inbound) or emitting (outbound) object,
//! never a subscriber.

use crate::{EventError, MessageKind};
use scenebridge_types::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One wire event.
///
/// Immutable after it has been encoded into the outbound queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Event or message kind name.
    pub event: String,
    /// Target (inbound) or source (outbound) object. Absent decodes as the
    /// empty id, which the registry never issues.
    #[serde(default)]
    pub id: ObjectId,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Optional sub-path rooted at the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl WireEvent {
    /// Creates an event without data or path.
    #[must_use]
    pub fn new(event: impl Into<String>, id: ObjectId) -> Self {
        Self {
            event: event.into(),
            id,
            data: None,
            path: None,
        }
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the sub-path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Decodes one event from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// [`EventError::Decode`] when the value is not an object or lacks a
    /// string `event` field.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        if !value.is_object() {
            return Err(EventError::Decode(format!(
                "event must be a JSON object, got {}",
                value_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| EventError::Decode(e.to_string()))
    }

    /// Decodes one event from its JSON text.
    ///
    /// # Errors
    ///
    /// [`EventError::Decode`] on malformed JSON.
    pub fn decode(text: &str) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| EventError::Decode(e.to_string()))?;
        Self::from_value(value)
    }

    /// Encodes the event as compact JSON text.
    ///
    /// # Errors
    ///
    /// [`EventError::Decode`] if serialization fails, which cannot happen
    /// for values built from `serde_json::Value`.
    pub fn encode(&self) -> Result<String, EventError> {
        serde_json::to_string(self).map_err(|e| EventError::Decode(e.to_string()))
    }

    /// Parses the `event` field as a protocol message kind.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownKind`] for application event names.
    pub fn kind(&self) -> Result<MessageKind, EventError> {
        self.event.parse()
    }

    /// Returns the sub-path, or `""` (the object itself) when absent.
    #[must_use]
    pub fn path_str(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }

    /// Returns `data.<name>` if `data` is an object containing it.
    #[must_use]
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(name))
    }

    /// Returns `data.<name>`, failing when absent or `null`.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingField`] naming `data.<name>`.
    pub fn require_data_field(&self, name: &str) -> Result<&Value, EventError> {
        match self.data_field(name) {
            Some(Value::Null) | None => Err(EventError::missing_field(
                self.event.clone(),
                format!("data.{name}"),
            )),
            Some(v) => Ok(v),
        }
    }

    /// Returns `data`, failing when absent or `null`.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingField`] naming `data`.
    pub fn require_data(&self) -> Result<&Value, EventError> {
        match &self.data {
            Some(Value::Null) | None => Err(EventError::missing_field(self.event.clone(), "data")),
            Some(v) => Ok(v),
        }
    }
}

/// Short name of a JSON value's kind, used in error messages and logs.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_omits_absent_fields() {
        let ev = WireEvent::new("Created", ObjectId::from("obj1"));
        assert_eq!(
            ev.encode().expect("encode should succeed"),
            r#"{"event":"Created","id":"obj1"}"#
        );
    }

    #[test]
    fn encode_with_data_and_path() {
        let ev = WireEvent::new("Update", ObjectId::from("a"))
            .with_data(json!({"visible": false}))
            .with_path("transform");
        let text = ev.encode().expect("encode should succeed");
        let back = WireEvent::decode(&text).expect("decode should succeed");
        assert_eq!(back, ev);
    }

    #[test]
    fn decode_without_id_yields_empty_id() {
        let ev = WireEvent::decode(r#"{"event":"Log","data":{"line":"hi"}}"#)
            .expect("decode should succeed");
        assert!(ev.id.is_empty());
        assert_eq!(ev.kind(), Ok(MessageKind::Log));
    }

    #[test]
    fn decode_rejects_non_object() {
        let err = WireEvent::from_value(json!([1, 2])).expect_err("arrays are not events");
        assert!(matches!(err, EventError::Decode(msg) if msg.contains("array")));
    }

    #[test]
    fn decode_rejects_missing_event_field() {
        assert!(WireEvent::decode(r#"{"id":"x"}"#).is_err());
    }

    #[test]
    fn required_fields() {
        let ev = WireEvent::new("DestroyAfter", ObjectId::from("a")).with_data(json!({"delay": null}));
        let err = ev.require_data_field("delay").expect_err("null counts as missing");
        assert_eq!(err, EventError::missing_field("DestroyAfter", "data.delay"));

        let ev = WireEvent::new("Update", ObjectId::from("a"));
        assert!(ev.require_data().is_err());
        assert_eq!(ev.path_str(), "");
    }

    #[test]
    fn application_event_kind_is_unknown() {
        let ev = WireEvent::new("Clicked", ObjectId::from("a"));
        assert!(ev.kind().is_err());
    }
}
