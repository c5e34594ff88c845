//! SceneBridge Runtime.
//!
//! The runtime side of the bridge protocol: it owns the remote objects,
//! routes inbound messages to them, and filters outbound events through
//! per-object interests before they reach the transport.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SDK Layer                              │
//! │  scenebridge-types  : ObjectId, CallbackId, ErrorCode        │
//! │  scenebridge-event  : WireEvent, Interests, codecs           │
//! │  scenebridge-object : paths, accessors, SceneObject trait    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  registry/  : Registry, RemoteObject, LifecycleState         │
//! │  bridge/    : Bridge (handlers, interest engine, lifecycle)  │
//! │  queue      : EventQueue, InboundHandle                      │
//! │  transport/ : Transport, TransportAdapter                    │
//! │  runner     : BridgeRunner (tokio)                           │
//! │  scene/     : builtin templates and capabilities             │
//! │  config/    : BridgeConfig, ConfigLoader                     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! │  scenebridge-cli : stdio bridge binary                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`bridge`] - Bridge Protocol
//!
//! - [`Bridge`]: the context object every operation goes through
//! - [`CreateSpec`]: parsed `Create` message
//! - [`CallbackRouter`]: at-most-once query result delivery
//!
//! ## [`registry`] - Remote Object Registry
//!
//! - [`Registry`]: single owner of every [`RemoteObject`]
//!
//! ## [`transport`] - Event Queue & Transport Adapter
//!
//! - [`EventQueue`]: shared FIFO of encoded strings
//! - [`TransportAdapter`]: start/stop/ready and batched flushing
//! - [`BridgeRunner`]: drives a bridge and a transport on a tokio task
//!
//! ## [`config`] - Configuration Management
//!
//! Configuration priority: CLI > Environment > Project > Global > Default
//!
//! # Threading
//!
//! One task owns the [`Bridge`]. Only the queues are shared: an
//! [`InboundHandle`] may push batches from a transport thread, and the
//! outbound [`EventQueue`] may be drained from another.

pub mod bridge;
pub mod config;
mod error;
mod listener;
mod queue;
pub mod registry;
mod runner;
pub mod scene;
pub mod transport;

pub use bridge::{AnimationStep, Bridge, CallbackRouter, CreateSpec, Delivery, Ease, QueryListener};
pub use config::{
    default_config_dir, default_config_path, BridgeConfig, ConfigError, ConfigLoader,
    ConfigResolver, NoOpResolver,
};
pub use error::{BridgeError, TransportError};
pub use listener::ModelListener;
pub use queue::{EventQueue, InboundHandle};
pub use registry::{LifecycleState, Registry, RemoteObject};
pub use runner::{BridgeRunner, RunnerHandle};
pub use scene::TemplateCatalog;
pub use transport::{ChannelTransport, Transport, TransportAdapter, TransportState};
