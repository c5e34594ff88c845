//! Runtime errors.
//!
//! | Error | Prefix | Raised by |
//! |-------|--------|-----------|
//! | [`BridgeError`] | `BRIDGE_` | handlers, registry, dispatcher |
//! | [`TransportError`] | `TRANSPORT_` | [`Transport`](crate::Transport) implementations |
//!
//! No bridge error crosses [`Bridge::dispatch_inbound`](crate::Bridge::dispatch_inbound)
//! or [`Bridge::emit`](crate::Bridge::emit): both catch at the smallest
//! scope (per key, per event) and log with structured fields.

use scenebridge_event::EventError;
use scenebridge_object::ResolveError;
use scenebridge_types::{CallbackId, ErrorCode, ObjectId};
use thiserror::Error;

/// Bridge operation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// A non-optional path step could not be resolved.
    #[error("resolution failed on `{object}`: {source}")]
    Resolution {
        object: ObjectId,
        #[source]
        source: ResolveError,
    },

    /// A wire value could not be converted to the member's native type.
    #[error("conversion failed on `{object}` for `{field}`: expected {expected}, got {actual}")]
    Conversion {
        object: ObjectId,
        field: String,
        expected: String,
        actual: String,
    },

    /// No live object with this id.
    #[error("unknown object `{0}`")]
    UnknownObject(ObjectId),

    /// The `event` field names no inbound message kind.
    #[error("unknown message kind `{0}`")]
    UnknownMessageKind(String),

    /// A callback id fired a second time.
    #[error("callback `{0}` already delivered")]
    DuplicateCallback(CallbackId),

    /// `Create` named a template the catalog does not know.
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),

    /// `AddComponent` or `Create.components` named an unknown capability.
    #[error("unknown capability `{0}`")]
    UnknownCapability(String),

    /// `Create` reused a live or retired id.
    #[error("object id `{0}` is already in use or retired")]
    DuplicateObjectId(ObjectId),

    /// A message is missing a field or holds the wrong kind of value.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] EventError),

    /// A parent is unknown, not live, or would create a cycle.
    #[error("invalid parent for `{object}`: {reason}")]
    InvalidParent { object: ObjectId, reason: String },

    /// Another exclusive bridge is alive in this process.
    #[error("a bridge is already running in this process")]
    AlreadyRunning,
}

impl BridgeError {
    /// Wraps a resolver error for `object`, lifting conversions to
    /// [`Conversion`](Self::Conversion).
    #[must_use]
    pub fn resolve(object: &ObjectId, source: ResolveError) -> Self {
        match source {
            ResolveError::Conversion {
                field,
                expected,
                actual,
            } => Self::Conversion {
                object: object.clone(),
                field,
                expected,
                actual,
            },
            source => Self::Resolution {
                object: object.clone(),
                source,
            },
        }
    }

    #[must_use]
    pub fn invalid_parent(object: &ObjectId, reason: impl Into<String>) -> Self {
        Self::InvalidParent {
            object: object.clone(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for BridgeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "BRIDGE_RESOLUTION",
            Self::Conversion { .. } => "BRIDGE_CONVERSION",
            Self::UnknownObject(_) => "BRIDGE_UNKNOWN_OBJECT",
            Self::UnknownMessageKind(_) => "BRIDGE_UNKNOWN_MESSAGE_KIND",
            Self::DuplicateCallback(_) => "BRIDGE_DUPLICATE_CALLBACK",
            Self::UnknownTemplate(_) => "BRIDGE_UNKNOWN_TEMPLATE",
            Self::UnknownCapability(_) => "BRIDGE_UNKNOWN_CAPABILITY",
            Self::DuplicateObjectId(_) => "BRIDGE_DUPLICATE_OBJECT_ID",
            Self::InvalidMessage(_) => "BRIDGE_INVALID_MESSAGE",
            Self::InvalidParent { .. } => "BRIDGE_INVALID_PARENT",
            Self::AlreadyRunning => "BRIDGE_ALREADY_RUNNING",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The object may still be created, the other bridge may still drop.
        matches!(self, Self::UnknownObject(_) | Self::AlreadyRunning)
    }
}

/// Transport error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has not signalled readiness yet.
    #[error("transport not ready")]
    NotReady,

    /// A send failed; the batch is requeued.
    #[error("send failed: {0}")]
    Send(String),

    /// The peer is gone.
    #[error("transport closed")]
    Closed,
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotReady => "TRANSPORT_NOT_READY",
            Self::Send(_) => "TRANSPORT_SEND",
            Self::Closed => "TRANSPORT_CLOSED",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}
