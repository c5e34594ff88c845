//! Wire-level types for SceneBridge.
//!
//! This crate defines everything that crosses the transport boundary: the
//! event envelope, the recognized message kinds, per-event interest specs
//! and the codecs that pack events into batches.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SDK Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenebridge-types  : ObjectId, CallbackId, ErrorCode        │
//! │  scenebridge-event  : WireEvent, Interests, codecs  ◄ HERE   │
//! │  scenebridge-object : paths, accessors, SceneObject trait    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Message Flow
//!
//! ```text
//! remote ──batch──► BatchCodec::split ──► WireEvent ──► MessageKind
//!                                                          │
//!                                                  bridge handlers
//!                                                          │
//! remote ◄──batch── BatchCodec::join ◄── encoded WireEvent ◄┘
//!                                         (filtered by Interests)
//! ```
//!
//! # Example
//!
//! ```
//! use scenebridge_event::{BatchCodec, JsonArrayCodec, WireEvent};
//! use scenebridge_types::ObjectId;
//!
//! let created = WireEvent::new("Created", ObjectId::from("obj1"));
//! let batch = JsonArrayCodec.join(&[created.encode().unwrap()]);
//! assert_eq!(batch, r#"[{"event":"Created","id":"obj1"}]"#);
//! ```

mod batch;
mod envelope;
mod error;
mod interest;
mod kind;

pub use batch::{BatchCodec, CodecKind, JsonArrayCodec, LineCodec};
pub use envelope::{value_kind, WireEvent};
pub use error::EventError;
pub use interest::{InterestSpec, Interests};
pub use kind::{is_unconditional_event, MessageKind};
