//! # Boundary contracts for external collaborators.
//!
//! The orchestration core coordinates subsystems it deliberately knows
//! nothing about: the host's bootstrap state, the mutable configuration
//! environment, and the runtime context (dependency container) with its own
//! event bus. This module defines the minimal surface the core needs from
//! each of them:
//!
//! - [`BootstrapHandle`] — opaque, passed through unchanged, read-only here.
//! - [`Environment`] — mutable key space the core hands to environment
//!   mutators; the core itself never reads or writes it.
//! - [`RuntimeContext`] — "is active" query, event bus (`publish` /
//!   `add_observer`), and the "primary multicaster wired" query used to
//!   route the `Failed` phase.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::BootError;
use crate::events::Event;
use crate::observers::ObserverRef;

/// Opaque handle to the host's bootstrap state.
///
/// Carried by the `Starting` and `EnvironmentPrepared` events and passed
/// through to observers and mutators unchanged. Observers that know the
/// concrete type can recover it with [`downcast_ref`](Self::downcast_ref).
#[derive(Clone)]
pub struct BootstrapHandle(Arc<dyn Any + Send + Sync>);

impl BootstrapHandle {
    /// Wraps an arbitrary bootstrap state value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Recovers the wrapped value, if it has type `T`.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for BootstrapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BootstrapHandle(..)")
    }
}

/// Mutable key space prepared before the runtime context exists.
///
/// Implementations use interior mutability: the same handle is shared by
/// every mutator in the chain, and later mutators must observe earlier
/// mutations (sequencing is enforced by the dispatcher, not by this trait).
pub trait Environment: Send + Sync {
    /// Reads a key, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a key, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Whether a key is set.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Shared handle to an [`Environment`].
pub type EnvironmentRef = Arc<dyn Environment>;

/// In-memory [`Environment`] backed by a map.
///
/// Reference implementation, useful for demos and tests. Hosts with a real
/// configuration model provide their own adapter.
#[derive(Default)]
pub struct MapEnvironment {
    values: RwLock<HashMap<String, String>>,
}

impl MapEnvironment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty environment as a shared handle.
    pub fn arc() -> EnvironmentRef {
        Arc::new(Self::new())
    }
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

/// Boundary contract for the runtime context.
///
/// From `ContextLoaded` onward the context owns its own event bus; the
/// orchestrator attaches the initial observers to it and publishes the
/// later phases (`Started`, `Running`, and usually `Failed`) through it.
#[async_trait]
pub trait RuntimeContext: Send + Sync {
    /// Whether the context has been activated (refreshed) by the host.
    fn is_active(&self) -> bool;

    /// Whether the context's primary event multicaster has been wired.
    ///
    /// The `Failed` path publishes through the context only when this and
    /// [`is_active`](Self::is_active) both hold; otherwise it falls back to
    /// the orchestrator's initial multicaster.
    fn multicaster_ready(&self) -> bool;

    /// Publishes one phase event on the context's own bus.
    async fn publish(&self, event: &Event) -> Result<(), BootError>;

    /// Attaches an observer to the context's own bus.
    fn add_observer(&self, observer: ObserverRef);
}

/// Shared handle to a [`RuntimeContext`].
pub type ContextRef = Arc<dyn RuntimeContext>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_handle_downcast() {
        let handle = BootstrapHandle::new(42u32);
        assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
        assert!(handle.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_map_environment_roundtrip() {
        let env = MapEnvironment::new();
        assert!(!env.contains("app.name"));
        env.set("app.name", "demo".into());
        assert_eq!(env.get("app.name").as_deref(), Some("demo"));
        env.set("app.name", "demo2".into());
        assert_eq!(env.get("app.name").as_deref(), Some("demo2"));
    }
}
