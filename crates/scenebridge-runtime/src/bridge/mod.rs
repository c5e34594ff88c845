//! The bridge context object.
//!
//! [`Bridge`] owns everything the single logical bridge thread mutates:
//!
//! ```text
//! ┌──────────────────────────────── Bridge ────────────────────────────────┐
//! │                                                                        │
//! │  inbound: EventQueue ──► dispatch_inbound ──► handlers ──► Registry    │
//! │       ▲                        │                  │           │        │
//! │  InboundHandle                 │              listeners   take_emissions
//! │  (transport thread)            ▼                              │        │
//! │                          CallbackRouter                     emit       │
//! │                                                               │        │
//! │  tick(dt) ──► DestroyTimers / Animations ─────────────────────┤        │
//! │                                                               ▼        │
//! │  outbound: EventQueue ◄──────────── interest gate (Interests per object)│
//! │       │                                                                │
//! └───────┼────────────────────────────────────────────────────────────────┘
//!         ▼
//!   TransportAdapter::flush / drain_outbound
//! ```
//!
//! There is no global instance. Everything that needs the bridge is given
//! a `&mut Bridge`. With `bridge.exclusive = true` (the default) at most
//! one bridge exists per process; a second [`Bridge::new`] fails with
//! [`BridgeError::AlreadyRunning`] until the first is dropped.
//!
//! # Example
//!
//! ```
//! use scenebridge_runtime::config::BridgeConfig;
//! use scenebridge_runtime::{Bridge, CreateSpec};
//! use scenebridge_types::ObjectId;
//!
//! let mut bridge = Bridge::new(BridgeConfig::shared()).unwrap();
//! let id = bridge
//!     .create(CreateSpec::new("Widget").with_id(ObjectId::from("obj1")))
//!     .unwrap();
//! assert_eq!(id.as_str(), "obj1");
//! assert_eq!(
//!     bridge.drain_outbound(10).as_deref(),
//!     Some(r#"[{"event":"Created","id":"obj1"}]"#)
//! );
//! ```

mod animation;
mod callback;
mod dispatch;
mod handlers;
mod interest;
mod lifecycle;
mod path_cache;
mod timer;

pub use animation::{AnimationStep, Ease};
pub use callback::{CallbackRouter, Delivery, QueryListener};
pub use lifecycle::CreateSpec;

use crate::config::BridgeConfig;
use crate::listener::Listeners;
use crate::queue::{EventQueue, InboundHandle};
use crate::registry::{Registry, RemoteObject};
use crate::scene::TemplateCatalog;
use crate::{BridgeError, ModelListener};
use animation::Animations;
use path_cache::PathCache;
use scenebridge_event::BatchCodec;
use scenebridge_object::{get_value, PathExpression, ResolveError};
use scenebridge_types::{CallbackId, ErrorCode, ListenerId, ObjectId};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use timer::DestroyTimers;
use tracing::{debug, warn};

/// Set while an exclusive bridge is alive.
static EXCLUSIVE_BRIDGE: AtomicBool = AtomicBool::new(false);

/// Process-wide claim held by an exclusive bridge.
#[derive(Debug)]
struct ExclusiveGuard;

impl ExclusiveGuard {
    fn acquire() -> Result<Self, BridgeError> {
        EXCLUSIVE_BRIDGE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self)
            .map_err(|_| BridgeError::AlreadyRunning)
    }
}

impl Drop for ExclusiveGuard {
    fn drop(&mut self) {
        EXCLUSIVE_BRIDGE.store(false, Ordering::Release);
    }
}

/// The bridge: registry, interest engine, queues and lifecycle handlers.
pub struct Bridge {
    config: BridgeConfig,
    registry: Registry,
    catalog: TemplateCatalog,
    /// Individually encoded outbound events.
    outbound: EventQueue,
    /// Encoded inbound batches.
    inbound: EventQueue,
    codec: Box<dyn BatchCodec>,
    callbacks: CallbackRouter,
    timers: DestroyTimers,
    animations: Animations,
    listeners: Listeners,
    paths: PathCache,
    /// Nesting of synthetic interest events currently being dispatched.
    event_depth: usize,
    _guard: Option<ExclusiveGuard>,
}

impl Bridge {
    /// Creates a bridge with the builtin templates and capabilities.
    ///
    /// # Errors
    ///
    /// [`BridgeError::AlreadyRunning`] when `config.bridge.exclusive` is set
    /// and another exclusive bridge is alive.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        Self::with_catalog(config, TemplateCatalog::with_builtins())
    }

    /// Creates a bridge with a custom catalog.
    ///
    /// # Errors
    ///
    /// As [`Bridge::new`].
    pub fn with_catalog(config: BridgeConfig, catalog: TemplateCatalog) -> Result<Self, BridgeError> {
        let guard = if config.bridge.exclusive {
            Some(ExclusiveGuard::acquire()?)
        } else {
            None
        };
        let codec = config.transport.codec.build();
        debug!(
            codec = codec.name(),
            max_event_count = config.queue.max_event_count,
            exclusive = config.bridge.exclusive,
            "bridge created"
        );
        Ok(Self {
            config,
            registry: Registry::new(),
            catalog,
            outbound: EventQueue::new(),
            inbound: EventQueue::new(),
            codec,
            callbacks: CallbackRouter::new(),
            timers: DestroyTimers::default(),
            animations: Animations::default(),
            listeners: Listeners::default(),
            paths: PathCache::default(),
            event_depth: 0,
            _guard: guard,
        })
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a registered object.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&RemoteObject> {
        self.registry.get(id)
    }

    /// The catalog used by `Create` and `AddComponent`.
    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }

    #[must_use]
    pub fn codec(&self) -> &dyn BatchCodec {
        self.codec.as_ref()
    }

    /// Registers a view-layer listener.
    pub fn add_listener(&mut self, listener: Box<dyn ModelListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unregisters a listener. Returns `false` for unknown ids.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Registers a local query listener and returns its fresh callback id.
    ///
    /// Pass the id to [`Bridge::handle_query`]; the listener fires at most
    /// once.
    pub fn register_callback(&mut self, listener: Box<dyn QueryListener>) -> CallbackId {
        self.callbacks.register(listener)
    }

    /// Local callbacks still waiting for a result.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.pending()
    }

    /// A handle another thread can push inbound batches through.
    #[must_use]
    pub fn inbound_handle(&self) -> InboundHandle {
        InboundHandle::new(self.inbound.clone())
    }

    /// The outbound queue, shared with transport adapters.
    #[must_use]
    pub fn outbound_queue(&self) -> EventQueue {
        self.outbound.clone()
    }

    /// Returns `true` while a delayed destroy is armed for `id`.
    #[must_use]
    pub fn has_pending_destroy(&self, id: &ObjectId) -> bool {
        self.timers.is_armed(id)
    }

    /// Returns `true` while `id` has a running animation track.
    #[must_use]
    pub fn is_animating(&self, id: &ObjectId) -> bool {
        self.animations.is_animating(id)
    }

    // ── Shared helpers ──────────────────────────────────────────────

    fn ensure_active(&self, id: &ObjectId) -> Result<(), BridgeError> {
        if self.registry.is_active(id) {
            Ok(())
        } else {
            Err(BridgeError::UnknownObject(id.clone()))
        }
    }

    fn parse_path(&mut self, id: &ObjectId, path: &str) -> Result<Arc<PathExpression>, BridgeError> {
        self.paths
            .get(path)
            .map_err(|e| BridgeError::resolve(id, ResolveError::Parse(e)))
    }

    /// Reads the value at `path` under `id`. `Ok(None)` is an optional miss.
    fn read_path(&mut self, id: &ObjectId, path: &str) -> Result<Option<Value>, BridgeError> {
        let expr = self.parse_path(id, path)?;
        get_value(&mut self.registry, id, &expr).map_err(|e| BridgeError::resolve(id, e))
    }

    /// Drains emissions queued by scene objects and runs them through
    /// [`Bridge::emit`]. Emissions caused by emissions are picked up by the
    /// next round, up to the event depth limit.
    fn flush_emissions(&mut self) {
        for _ in 0..=self.config.interests.max_event_depth {
            let pending = self.registry.take_emissions();
            if pending.is_empty() {
                return;
            }
            for (id, emission) in pending {
                self.emit(&id, &emission.event, emission.data);
            }
        }
        warn!(
            max_event_depth = self.config.interests.max_event_depth,
            "scene emissions still pending after depth limit"
        );
    }
}

/// Logs a caught bridge error with structured fields.
///
/// `event` is the message kind or event name being processed.
pub(crate) fn report(err: &BridgeError, event: &str, object: &ObjectId, path: Option<&str>) {
    let path = path.unwrap_or("");
    match err {
        BridgeError::Conversion {
            field,
            expected,
            actual,
            ..
        } => warn!(
            code = err.code(),
            event,
            object = %object,
            path,
            field = %field,
            expected = %expected,
            actual = %actual,
            "{err}"
        ),
        BridgeError::UnknownObject(_) | BridgeError::DuplicateCallback(_) => warn!(
            code = err.code(),
            event,
            object = %object,
            path,
            "{err}"
        ),
        _ => warn!(
            code = err.code(),
            event,
            object = %object,
            path,
            recoverable = err.is_recoverable(),
            "{err}"
        ),
    }
}
