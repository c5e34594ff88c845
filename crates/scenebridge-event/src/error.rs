//! Event layer errors.
//!
//! All event errors use the `EVENT_` prefix for their codes:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::Decode`] | `EVENT_DECODE` | No |
//! | [`EventError::MissingField`] | `EVENT_MISSING_FIELD` | No |
//! | [`EventError::InvalidField`] | `EVENT_INVALID_FIELD` | No |
//! | [`EventError::UnknownKind`] | `EVENT_UNKNOWN_KIND` | No |
//!
//! None of these are recoverable: a malformed message stays malformed no
//! matter how often it is dispatched. The dispatcher logs the code and
//! moves on to the next event in the batch.
//!
//! # Usage
//!
//! ```
//! use scenebridge_event::EventError;
//! use scenebridge_types::ErrorCode;
//!
//! let err = EventError::missing_field("Query", "data.callbackID");
//! assert_eq!(err.code(), "EVENT_MISSING_FIELD");
//! assert!(err.to_string().contains("data.callbackID"));
//! ```

use scenebridge_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event layer error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum EventError {
    /// A batch or a single event was not valid JSON, or not a JSON object.
    #[error("decode failed: {0}")]
    Decode(String),

    /// A field required by the message kind is absent.
    #[error("{kind}: missing required field `{field}`")]
    MissingField {
        /// Message kind being decoded.
        kind: String,
        /// Dotted field path, e.g. `data.delay`.
        field: String,
    },

    /// A field is present but holds the wrong kind of value.
    #[error("invalid field `{field}`: expected {expected}, got {actual}")]
    InvalidField {
        /// Dotted field path.
        field: String,
        /// Expected wire kind.
        expected: String,
        /// Actual wire kind (or a short description of the problem).
        actual: String,
    },

    /// The `event` field names no known message kind.
    #[error("unknown message kind: {0}")]
    UnknownKind(String),
}

impl EventError {
    /// Creates a [`MissingField`](Self::MissingField) error.
    #[must_use]
    pub fn missing_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    /// Creates an [`InvalidField`](Self::InvalidField) error.
    #[must_use]
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "EVENT_DECODE",
            Self::MissingField { .. } => "EVENT_MISSING_FIELD",
            Self::InvalidField { .. } => "EVENT_INVALID_FIELD",
            Self::UnknownKind(_) => "EVENT_UNKNOWN_KIND",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
