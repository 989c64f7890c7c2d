//! Builder for the orchestrator.

use std::sync::Arc;

use crate::events::EventMulticaster;
use crate::observers::ObserverRef;
use crate::startup::{NoopStartup, StartupRef};

use super::orchestrator::Orchestrator;

/// Builder constructing an [`Orchestrator`] with an explicit observer set.
///
/// Observers are injected here, never discovered implicitly: the host
/// decides the set, which also makes it trivially substitutable in tests.
/// Registration order breaks priority ties.
pub struct OrchestratorBuilder {
    observers: Vec<ObserverRef>,
    startup: StartupRef,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    /// Creates a builder with no observers and no-op instrumentation.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            startup: Arc::new(NoopStartup),
        }
    }

    /// Registers one observer.
    pub fn observer(mut self, observer: ObserverRef) -> Self {
        self.observers.push(observer);
        self
    }

    /// Registers a batch of observers, keeping their order.
    pub fn observers(mut self, observers: impl IntoIterator<Item = ObserverRef>) -> Self {
        self.observers.extend(observers);
        self
    }

    /// Sets the instrumentation recorder wrapping each phase broadcast.
    pub fn startup(mut self, startup: StartupRef) -> Self {
        self.startup = startup;
        self
    }

    /// Builds the orchestrator, sorting the observer registry by
    /// `(priority, registration order)`.
    pub fn build(self) -> Orchestrator {
        Orchestrator::new_internal(
            EventMulticaster::with_observers(self.observers),
            self.startup,
        )
    }
}
