//! # EventMulticaster: ordered, sequential event dispatch.
//!
//! The multicaster owns the observer registry and delivers one [`Event`] to
//! every observer whose declared [`PhaseSet`] contains the event's phase.
//!
//! ## Guarantees
//! - **Ordering**: observers run in non-decreasing priority order; equal
//!   priorities keep registration order (stable sort). Ordering across
//!   observers for a single event is load-bearing: a log-configuring
//!   observer must run before one that logs through the final backend.
//! - **Sequential**: one observer at a time, each awaited to completion
//!   before the next starts. Never concurrent.
//! - **Fail-fast** ([`dispatch`](EventMulticaster::dispatch)): the first
//!   observer error aborts the remaining dispatch for that event.
//! - **Containment** ([`dispatch_contained`](EventMulticaster::dispatch_contained),
//!   for the `Failed` phase): observer N's error or panic never prevents
//!   observers N+1.. from running. Contained errors are logged, never
//!   discarded — unless the event carries no triggering error, in which
//!   case the handler's error is rethrown as-is (a missing original error
//!   is a caller contract violation worth surfacing loudly).

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::Level;

use crate::error::BootError;
use crate::observers::ObserverRef;

use super::event::{Event, Phase};

/// Ordered observer registry plus the dispatch loop.
///
/// Observers are only ever added, never removed. The registry is kept
/// sorted by `(priority, registration order)`.
#[derive(Default)]
pub struct EventMulticaster {
    observers: Vec<ObserverRef>,
}

impl EventMulticaster {
    /// Creates an empty multicaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a multicaster from an observer set, sorting it by priority.
    ///
    /// The input order is the registration order and breaks priority ties.
    pub fn with_observers(observers: Vec<ObserverRef>) -> Self {
        let mut multicaster = Self { observers };
        multicaster.sort();
        multicaster
    }

    /// Appends an observer, keeping the registry sorted.
    pub fn register(&mut self, observer: ObserverRef) {
        self.observers.push(observer);
        self.sort();
    }

    /// The registry in dispatch order.
    pub fn observers(&self) -> &[ObserverRef] {
        &self.observers
    }

    fn sort(&mut self) {
        // Stable: ties keep registration order.
        self.observers.sort_by_key(|obs| obs.priority());
    }

    /// Delivers `event` to every matching observer, in order, fail-fast.
    ///
    /// Used for every phase except `Failed`. The first observer error is
    /// wrapped with the observer's identity and the phase, and propagated;
    /// remaining observers are not invoked.
    pub async fn dispatch(&self, event: &Event) -> Result<(), BootError> {
        for observer in &self.observers {
            if !observer.phases().contains(event.phase) {
                continue;
            }
            observer
                .on_event(event)
                .await
                .map_err(|source| BootError::Dispatch {
                    observer: observer.name().to_string(),
                    phase: event.phase,
                    source,
                })?;
        }
        Ok(())
    }

    /// Delivers `event` to every matching observer with per-observer
    /// failure containment. Intended for the `Failed` phase.
    ///
    /// Errors and panics raised by an observer are caught. If the event
    /// carries a triggering error, the handler's own failure is logged
    /// (warn with its message, or error with full detail when debug
    /// verbosity is enabled) and dispatch continues. If the triggering
    /// error is absent, the handler's failure is returned immediately.
    pub async fn dispatch_contained(&self, event: &Event) -> Result<(), BootError> {
        for observer in &self.observers {
            if !observer.phases().contains(event.phase) {
                continue;
            }
            let reaction = AssertUnwindSafe(observer.on_event(event))
                .catch_unwind()
                .await;
            let failure = match reaction {
                Ok(Ok(())) => continue,
                Ok(Err(source)) => BootError::Dispatch {
                    observer: observer.name().to_string(),
                    phase: event.phase,
                    source,
                },
                Err(panic) => BootError::Panic {
                    observer: observer.name().to_string(),
                    phase: event.phase,
                    panic: panic_message(panic),
                },
            };
            if event.error.is_none() {
                return Err(failure);
            }
            contain(&failure);
        }
        Ok(())
    }
}

/// Logs a contained failure-handler error without discarding it.
///
/// Verbosity mirrors the enabled diagnostic level: full detail at debug,
/// a one-line warning otherwise.
fn contain(failure: &BootError) {
    if tracing::enabled!(Level::DEBUG) {
        tracing::error!(error = %failure, "error handling failed event");
    } else {
        tracing::warn!("error handling failed event ({})", failure.as_message());
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
