//! Message kinds carried in the `event` field of the wire envelope.
//!
//! # Direction
//!
//! | Kind | Direction | Handler |
//! |------|-----------|---------|
//! | `Create` | inbound | lifecycle: instantiate a template |
//! | `Update` | inbound | property writes / method calls |
//! | `Query` | inbound | read paths, reply via callback |
//! | `Destroy` | inbound | immediate teardown |
//! | `DestroyAfter` | inbound | delayed teardown |
//! | `AddComponent` | inbound | attach a capability |
//! | `SetParent` | inbound | reparent / detach |
//! | `Animate` | inbound | tick-driven interpolation |
//! | `UpdateInterests` | inbound | merge interest specs |
//! | `Log` | inbound | remote log line |
//! | `Created` | outbound | unconditional |
//! | `Destroyed` | outbound | unconditional |
//! | `Callback` | outbound | query result delivery |
//!
//! Any other event name emitted by a scene object is an application event
//! (e.g. `Clicked`) and is filtered through the object's interests.

use crate::EventError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized protocol message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Create,
    Update,
    Query,
    Destroy,
    DestroyAfter,
    AddComponent,
    SetParent,
    Animate,
    UpdateInterests,
    Log,
    Created,
    Destroyed,
    Callback,
}

impl MessageKind {
    /// Every kind, in wire-table order.
    pub const ALL: [MessageKind; 13] = [
        Self::Create,
        Self::Update,
        Self::Query,
        Self::Destroy,
        Self::DestroyAfter,
        Self::AddComponent,
        Self::SetParent,
        Self::Animate,
        Self::UpdateInterests,
        Self::Log,
        Self::Created,
        Self::Destroyed,
        Self::Callback,
    ];

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Query => "Query",
            Self::Destroy => "Destroy",
            Self::DestroyAfter => "DestroyAfter",
            Self::AddComponent => "AddComponent",
            Self::SetParent => "SetParent",
            Self::Animate => "Animate",
            Self::UpdateInterests => "UpdateInterests",
            Self::Log => "Log",
            Self::Created => "Created",
            Self::Destroyed => "Destroyed",
            Self::Callback => "Callback",
        }
    }

    /// Returns `true` for kinds the bridge accepts from the remote side.
    #[must_use]
    pub fn is_inbound(self) -> bool {
        !matches!(self, Self::Created | Self::Destroyed | Self::Callback)
    }

    /// Returns `true` for the two lifecycle events that bypass interests.
    #[must_use]
    pub fn is_unconditional(self) -> bool {
        matches!(self, Self::Created | Self::Destroyed)
    }
}

/// Returns `true` when `event_name` is `Created` or `Destroyed`.
///
/// Works on raw names so that application events never need parsing.
#[must_use]
pub fn is_unconditional_event(event_name: &str) -> bool {
    event_name == MessageKind::Created.as_str() || event_name == MessageKind::Destroyed.as_str()
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EventError::UnknownKind(s.to_string()))
    }
}
