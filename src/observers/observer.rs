//! # Core observer trait
//!
//! `Observer` is the extension point for participating in the bootstrap
//! phase sequence. Each observer declares the phases it reacts to and an
//! integer priority; the [`EventMulticaster`](crate::events::EventMulticaster)
//! invokes matching observers sequentially in `(priority, registration
//! order)` order.
//!
//! ## Contract
//! - `on_event` is awaited to completion before the next observer runs; a
//!   slow observer delays the whole phase (no timeouts by design).
//! - Returning an error from a non-`Failed` phase aborts the remaining
//!   dispatch for that event and fails the bootstrap phase call.
//! - Observers may spawn background work, but the orchestrator does not
//!   wait for it beyond `on_event`'s return; synchronizing with it before
//!   a later phase is the observer's own responsibility (see
//!   [`BackgroundInitializer`](crate::observers::BackgroundInitializer)).

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ObserverError;
use crate::events::{Event, PhaseSet};
use crate::handles::ContextRef;

/// Highest priority: runs before every default-priority observer.
pub const HIGHEST_PRIORITY: i32 = i32::MIN;

/// Lowest priority: runs after every default-priority observer.
pub const LOWEST_PRIORITY: i32 = i32::MAX;

/// Contract for bootstrap phase observers.
///
/// Called sequentially from the dispatch loop; implementations should
/// prefer async I/O and cooperative waits.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    /// Reacts to a single phase event.
    async fn on_event(&self, event: &Event) -> Result<(), ObserverError>;

    /// The phases this observer reacts to. Events for other phases are
    /// skipped without invoking the observer.
    fn phases(&self) -> PhaseSet {
        PhaseSet::ALL
    }

    /// Dispatch priority. Lower values run earlier; ties keep
    /// registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Human-readable name (for logs/metrics/error context).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once when the runtime context becomes available, before the
    /// `ContextLoaded` event is dispatched. Default: no-op. Context-aware
    /// observers override this to capture the handle.
    fn attach_context(&self, _context: &ContextRef) {}
}

/// Shared handle to an [`Observer`].
pub type ObserverRef = Arc<dyn Observer>;
